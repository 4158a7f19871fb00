//! Oriented-box geometry, the separating-axis test, and contact estimation.
//!
//! Everything here is a pure function of world-space vertices; the scene graph decides when the
//! geometry is valid to read.
#[allow(unused_imports)]
use crate::core::prelude::*;

use crate::util::gg_iter::GgFloatIter;
use crate::util::gg_range;
use crate::util::linalg::{normalize_angle, GeometryError, Mat3x3, Vec2};
use std::f32::consts::FRAC_PI_2;
use std::ops::Range;

pub const TOP_LEFT: usize = 0;
pub const TOP_RIGHT: usize = 1;
pub const BOTTOM_RIGHT: usize = 2;
pub const BOTTOM_LEFT: usize = 3;

pub trait Polygonal {
    fn vertices(&self) -> &[Vec2];
    /// Axes whose projections are sufficient to separate this shape from another.
    fn axes(&self) -> Vec<Vec2>;
    fn polygon_centre(&self) -> Vec2;

    fn project(&self, axis: Vec2) -> Range<f32> {
        let vertices = self.vertices().iter().map(|v| axis.dot(*v));
        let start = vertices.clone().min_f32().unwrap_or(0.0);
        let end = vertices.max_f32().unwrap_or(0.0);
        start..end
    }

    /// Separating axis test over this shape's axes, then the other's.
    ///
    /// Projections that merely touch count as separated, so shapes sharing an edge do not
    /// intersect.
    fn intersects<P: Polygonal>(&self, other: &P) -> bool
    where
        Self: Sized,
    {
        self.axes()
            .into_iter()
            .chain(other.axes())
            .all(|axis| gg_range::overlaps_f32(&self.project(axis), &other.project(axis)))
    }
}

/// An oriented bounding box in world space.
///
/// Vertices are wound clockwise (as seen with y pointing up) starting from the top-left corner
/// of the box in its own rotated frame: see [`TOP_LEFT`], [`TOP_RIGHT`], [`BOTTOM_RIGHT`] and
/// [`BOTTOM_LEFT`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Obb {
    vertices: [Vec2; 4],
    centre: Vec2,
    radius: f32,
    rotation: f32,
}

impl Obb {
    /// Derives the box of a sprite placed by `world`.
    ///
    /// `sprite_size` and `origin` are in unscaled sprite pixels, with `origin` measured from the
    /// sprite's top-left corner. Only `scale` (the node's own scale) sizes the box: the basis
    /// vectors of `world` are normalised, so ancestors' scales do not affect it.
    pub fn from_world(
        world: &Mat3x3,
        sprite_size: Vec2,
        origin: Vec2,
        scale: Vec2,
    ) -> Result<Obb, GeometryError> {
        let (row1, row2) = world.basis();
        let ax = row1.try_normed()?;
        let ay = row2.try_normed()?;
        let left = -origin.x * scale.x;
        let right = (sprite_size.x - origin.x) * scale.x;
        let top = origin.y * scale.y;
        let bottom = -(sprite_size.y - origin.y) * scale.y;
        Ok(Self::from_frame(
            world.translation_part(),
            ax,
            ay,
            [left, right, top, bottom],
            world.world_rotation(),
        ))
    }

    /// A box centred on `centre` with the given half-extents, rotated by `rotation` radians.
    pub fn from_centre(centre: Vec2, half_widths: Vec2, rotation: f32) -> Obb {
        let ax = Vec2::right().rotated(rotation);
        let ay = Vec2::up().rotated(rotation);
        Self::from_frame(
            centre,
            ax,
            ay,
            [-half_widths.x, half_widths.x, half_widths.y, -half_widths.y],
            normalize_angle(rotation),
        )
    }

    fn from_frame(pivot: Vec2, ax: Vec2, ay: Vec2, sides: [f32; 4], rotation: f32) -> Obb {
        let [left, right, top, bottom] = sides;
        let vertices = [
            pivot + left * ax + top * ay,
            pivot + right * ax + top * ay,
            pivot + right * ax + bottom * ay,
            pivot + left * ax + bottom * ay,
        ];
        let centre = pivot + (left + right) / 2.0 * ax + (top + bottom) / 2.0 * ay;
        let radius = vertices
            .iter()
            .map(|v| v.dist(centre))
            .max_f32()
            .unwrap_or(0.0);
        Obb {
            vertices,
            centre,
            radius,
            rotation,
        }
    }

    pub fn vertex(&self, index: usize) -> Vec2 {
        self.vertices[index % 4]
    }
    pub fn centre(&self) -> Vec2 {
        self.centre
    }
    /// Radius of the smallest circle about [`centre`](Obb::centre) containing every vertex.
    pub fn radius(&self) -> f32 {
        self.radius
    }
    pub fn rotation(&self) -> f32 {
        self.rotation
    }
    pub fn is_finite(&self) -> bool {
        self.vertices.iter().all(Vec2::is_finite) && self.radius.is_finite()
    }

    /// Outline as `(start, end)` pairs in winding order.
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        (0..4).map(|i| (self.vertex(i), self.vertex(i + 1)))
    }

    /// Bounding-circle overlap, compared squared. Never false for boxes that intersect.
    pub fn circles_overlap(&self, other: &Obb) -> bool {
        let reach = self.radius + other.radius;
        self.centre.dist_squared(other.centre) < reach * reach
    }

    /// Estimates which corner faces `towards` from the bearing of that point relative to this
    /// box's own rotation.
    pub fn closest_vertex_index(&self, towards: Vec2) -> usize {
        let bearing = (towards - self.centre).bearing();
        let relative = normalize_angle(bearing - self.rotation);
        if relative <= -FRAC_PI_2 {
            TOP_LEFT
        } else if relative <= 0.0 {
            TOP_RIGHT
        } else if relative <= FRAC_PI_2 {
            BOTTOM_RIGHT
        } else {
            BOTTOM_LEFT
        }
    }
}

impl Polygonal for Obb {
    fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }
    fn axes(&self) -> Vec<Vec2> {
        vec![
            self.vertices[BOTTOM_RIGHT] - self.vertices[BOTTOM_LEFT],
            self.vertices[TOP_LEFT] - self.vertices[BOTTOM_LEFT],
        ]
    }
    fn polygon_centre(&self) -> Vec2 {
        self.centre
    }
}

/// Which of the two boxes passed to [`resolve_contact`] a contact feature belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContactSide {
    First,
    Second,
}

impl ContactSide {
    #[must_use]
    pub fn other(self) -> ContactSide {
        match self {
            ContactSide::First => ContactSide::Second,
            ContactSide::Second => ContactSide::First,
        }
    }
}

/// An estimated contact: a vertex of one box against an edge of the other.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Contact {
    pub point: Vec2,
    pub edge: (Vec2, Vec2),
    /// How far `point` lies behind the edge, along [`normal`](Contact::normal). Zero when the
    /// contact was chosen by proximity only.
    pub depth: f32,
    pub edge_owner: ContactSide,
}

impl Contact {
    /// Unit outward normal of the contacted edge, pointing towards the box owning `point`.
    pub fn normal(&self) -> Vec2 {
        edge_normal(self.edge.0, self.edge.1).unwrap_or_else(|_| Vec2::zero())
    }

    pub fn point_owner(&self) -> ContactSide {
        self.edge_owner.other()
    }

    /// Reflects `velocity` about the contacted edge.
    pub fn reflect(&self, velocity: Vec2) -> Vec2 {
        velocity.reflect(self.normal())
    }

    /// The translation that moves `side` out of the other box by the full contact depth.
    pub fn separation_for(&self, side: ContactSide) -> Vec2 {
        let push = self.depth * self.normal();
        if side == self.point_owner() { push } else { -push }
    }
}

// Winding is clockwise in a y-up world, so the outward normal is the counter-clockwise
// perpendicular of the edge direction.
fn edge_normal(start: Vec2, end: Vec2) -> Result<Vec2, GeometryError> {
    let dir = end - start;
    Vec2 {
        x: -dir.y,
        y: dir.x,
    }
    .try_normed()
}

#[derive(Copy, Clone)]
struct Candidate {
    contact: Contact,
    score: f32,
}

/// Scores the two edges of `edges_of` adjacent to corner `edge_corner` against the vertices of
/// `points_of` around corner `point_corner`.
///
/// An edge's score is the deepest penetration of any candidate vertex behind it; the edge with
/// the shallowest such penetration is the face the vertex most plausibly crossed. Edges no
/// candidate vertex is behind are skipped. Returns the best penetrating candidate and, as a
/// fallback, the vertex/edge pair with the smallest perpendicular distance.
fn scan_window(
    edges_of: &Obb,
    edge_corner: usize,
    points_of: &Obb,
    point_corner: usize,
    edge_owner: ContactSide,
) -> (Option<Candidate>, Option<Candidate>) {
    let points = [
        points_of.vertex(point_corner),
        points_of.vertex(point_corner + 3),
        points_of.vertex(point_corner + 1),
    ];
    let edges = [
        (edges_of.vertex(edge_corner + 3), edges_of.vertex(edge_corner)),
        (edges_of.vertex(edge_corner), edges_of.vertex(edge_corner + 1)),
    ];

    let mut best: Option<Candidate> = None;
    let mut nearest: Option<Candidate> = None;
    for (start, end) in edges {
        let Ok(normal) = edge_normal(start, end) else {
            continue;
        };
        let mut deepest: Option<(Vec2, f32)> = None;
        for point in points {
            let depth = -(point - start).dot(normal);
            if deepest.is_none_or(|(_, d)| depth > d) {
                deepest = Some((point, depth));
            }
            let dist = point.dist_to_line(start, end);
            if nearest.is_none_or(|c| dist < c.score) {
                nearest = Some(Candidate {
                    contact: Contact {
                        point,
                        edge: (start, end),
                        depth: 0.0,
                        edge_owner,
                    },
                    score: dist,
                });
            }
        }
        if let Some((point, depth)) = deepest.filter(|(_, d)| *d > 0.0) {
            if best.is_none_or(|c| depth < c.score) {
                best = Some(Candidate {
                    contact: Contact {
                        point,
                        edge: (start, end),
                        depth,
                        edge_owner,
                    },
                    score: depth,
                });
            }
        }
    }
    (best, nearest)
}

fn pick(first: Option<Candidate>, second: Option<Candidate>) -> Option<Candidate> {
    match (first, second) {
        (Some(a), Some(b)) => Some(if b.score < a.score { b } else { a }),
        (a, b) => a.or(b),
    }
}

/// Estimates the contact between two intersecting boxes.
///
/// Each box's corner facing the other is guessed from the bearing between centres. The vertices
/// of `a` near its facing corner are tested against the two edges of `b` adjacent to `b`'s
/// facing corner, then symmetrically. This is a heuristic: it inspects a small window of
/// features and can miss the true nearest feature for deep or near-corner contacts. On a tie the
/// edge of `b` wins.
///
/// Returns `None` only if every candidate edge is degenerate.
pub fn resolve_contact(a: &Obb, b: &Obb) -> Option<Contact> {
    let corner_a = a.closest_vertex_index(b.centre());
    let corner_b = b.closest_vertex_index(a.centre());
    let (best_on_b, nearest_on_b) = scan_window(b, corner_b, a, corner_a, ContactSide::Second);
    let (best_on_a, nearest_on_a) = scan_window(a, corner_a, b, corner_b, ContactSide::First);
    pick(best_on_b, best_on_a)
        .or_else(|| pick(nearest_on_b, nearest_on_a))
        .map(|c| c.contact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    fn unit_square(x: f32, y: f32) -> Obb {
        Obb::from_centre(Vec2 { x, y }, Vec2::splat(0.5), 0.0)
    }

    #[test]
    fn from_world_with_centred_origin() {
        let world = Mat3x3::translation(10.0, 5.0);
        let obb = Obb::from_world(
            &world,
            Vec2 { x: 4.0, y: 2.0 },
            Vec2 { x: 2.0, y: 1.0 },
            Vec2::one(),
        )
        .unwrap();
        assert_eq!(obb.vertex(TOP_LEFT), Vec2 { x: 8.0, y: 6.0 });
        assert_eq!(obb.vertex(TOP_RIGHT), Vec2 { x: 12.0, y: 6.0 });
        assert_eq!(obb.vertex(BOTTOM_RIGHT), Vec2 { x: 12.0, y: 4.0 });
        assert_eq!(obb.vertex(BOTTOM_LEFT), Vec2 { x: 8.0, y: 4.0 });
        assert_eq!(obb.centre(), Vec2 { x: 10.0, y: 5.0 });
        assert!((obb.radius() - 5.0_f32.sqrt()).abs() < EPSILON);
    }

    #[test]
    fn from_world_with_offset_origin() {
        // Pivot at the bottom-centre of an 8x40 sprite, scaled 3x2 and rotated a quarter turn.
        let scale = Vec2 { x: 3.0, y: 2.0 };
        let world = Mat3x3::scale_vec2(scale) * Mat3x3::rotation(FRAC_PI_2);
        let obb = Obb::from_world(
            &world,
            Vec2 { x: 8.0, y: 40.0 },
            Vec2 { x: 4.0, y: 40.0 },
            scale,
        )
        .unwrap();
        // The sprite now extends along +x from the pivot.
        assert_eq!(obb.centre(), Vec2 { x: 40.0, y: 0.0 });
        assert_eq!(obb.vertex(TOP_LEFT), Vec2 { x: 80.0, y: 12.0 });
        assert_eq!(obb.vertex(BOTTOM_LEFT), Vec2 { x: 0.0, y: 12.0 });
        assert!((obb.rotation() - FRAC_PI_2).abs() < EPSILON);
    }

    #[test]
    fn from_world_ignores_ancestor_scale() {
        let parent = Mat3x3::scale(10.0, 10.0);
        let world = Mat3x3::translation(1.0, 0.0) * parent;
        let obb = Obb::from_world(&world, Vec2::splat(2.0), Vec2::splat(1.0), Vec2::one()).unwrap();
        assert_eq!(obb.centre(), Vec2 { x: 10.0, y: 0.0 });
        assert!((obb.radius() - 2.0_f32.sqrt()).abs() < EPSILON);
    }

    #[test]
    fn from_world_degenerate_basis() {
        let world = Mat3x3::scale(0.0, 1.0);
        assert_eq!(
            Obb::from_world(&world, Vec2::one(), Vec2::zero(), Vec2::one()),
            Err(GeometryError::ZeroLengthVector)
        );
    }

    #[test]
    fn radius_grows_with_scale() {
        let small = Obb::from_world(&Mat3x3::one(), Vec2::splat(4.0), Vec2::zero(), Vec2::one());
        let large = Obb::from_world(
            &Mat3x3::scale(2.0, 2.0),
            Vec2::splat(4.0),
            Vec2::zero(),
            Vec2::splat(2.0),
        );
        assert!(large.unwrap().radius() > small.unwrap().radius());
    }

    #[test]
    fn touching_squares_do_not_intersect() {
        let a = unit_square(0.0, 0.0);
        assert!(!a.intersects(&unit_square(1.0, 0.0)));
        assert!(!unit_square(1.0, 0.0).intersects(&a));
        assert!(a.intersects(&unit_square(0.99, 0.0)));
        assert!(unit_square(0.99, 0.0).intersects(&a));
    }

    #[test]
    fn rotated_squares_need_both_axis_sets() {
        // Overlap on a's axes, but separated along b's diagonal axes.
        let a = unit_square(0.0, 0.0);
        let b = Obb::from_centre(Vec2 { x: 1.1, y: 1.1 }, Vec2::splat(0.5), FRAC_PI_4);
        assert!(gg_range::overlaps_f32(
            &a.project(Vec2::right()),
            &b.project(Vec2::right())
        ));
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
        let c = Obb::from_centre(Vec2 { x: 0.8, y: 0.8 }, Vec2::splat(0.5), FRAC_PI_4);
        assert!(a.intersects(&c));
    }

    #[test]
    fn circles_overlap_is_necessary_for_intersection() {
        let a = unit_square(0.0, 0.0);
        for x in [0.2, 0.6, 0.99, 1.3] {
            let b = Obb::from_centre(Vec2 { x, y: 0.4 }, Vec2::splat(0.5), 0.3);
            if a.intersects(&b) {
                assert!(a.circles_overlap(&b));
            }
        }
        assert!(!a.circles_overlap(&unit_square(10.0, 0.0)));
    }

    #[test]
    fn closest_vertex_buckets() {
        let a = unit_square(0.0, 0.0);
        assert_eq!(a.closest_vertex_index(Vec2 { x: -1.0, y: 1.0 }), TOP_LEFT);
        assert_eq!(a.closest_vertex_index(Vec2 { x: 1.0, y: 1.0 }), TOP_RIGHT);
        assert_eq!(a.closest_vertex_index(Vec2 { x: 1.0, y: -1.0 }), BOTTOM_RIGHT);
        assert_eq!(a.closest_vertex_index(Vec2 { x: -1.0, y: -1.0 }), BOTTOM_LEFT);
        // Rotating the box a quarter turn clockwise moves its top-left corner to the top-right.
        let rotated = Obb::from_centre(Vec2::zero(), Vec2::splat(0.5), FRAC_PI_2);
        assert_eq!(
            rotated.closest_vertex_index(Vec2 { x: 1.0, y: 1.0 }),
            TOP_LEFT
        );
    }

    #[test]
    fn contact_on_aligned_faces() {
        let stationary = Obb::from_centre(Vec2::zero(), Vec2::splat(20.0), 0.0);
        let moving = Obb::from_centre(Vec2 { x: 30.0, y: 0.0 }, Vec2::splat(20.0), 0.0);

        let contact = resolve_contact(&moving, &stationary).unwrap();
        assert_eq!(contact.edge_owner, ContactSide::Second);
        assert_eq!(
            contact.edge,
            (Vec2 { x: 20.0, y: 20.0 }, Vec2 { x: 20.0, y: -20.0 })
        );
        assert_eq!(contact.normal(), Vec2::right());
        assert!((contact.depth - 10.0).abs() < EPSILON);
        assert_eq!(
            contact.separation_for(ContactSide::First),
            Vec2 { x: 10.0, y: 0.0 }
        );
        assert_eq!(
            contact.separation_for(ContactSide::Second),
            Vec2 { x: -10.0, y: 0.0 }
        );

        let contact = resolve_contact(&stationary, &moving).unwrap();
        assert_eq!(
            contact.edge,
            (moving.vertex(BOTTOM_LEFT), moving.vertex(TOP_LEFT))
        );
        assert_eq!(contact.normal(), Vec2::left());
    }

    #[test]
    fn contact_reflects_velocity() {
        let floor = Obb::from_centre(Vec2::zero(), Vec2 { x: 50.0, y: 5.0 }, 0.0);
        let ball = Obb::from_centre(Vec2 { x: 3.0, y: 7.0 }, Vec2::splat(3.0), 0.0);
        assert!(ball.intersects(&floor));
        let contact = resolve_contact(&ball, &floor).unwrap();
        assert_eq!(contact.normal(), Vec2::up());
        assert!((contact.depth - 1.0).abs() < EPSILON);
        assert_eq!(
            contact.reflect(Vec2 { x: 2.0, y: -4.0 }),
            Vec2 { x: 2.0, y: 4.0 }
        );
    }

    #[test]
    fn contact_with_rotated_corner() {
        let wall = Obb::from_centre(Vec2::zero(), Vec2::splat(10.0), 0.0);
        let diamond = Obb::from_centre(Vec2 { x: 0.0, y: 16.0 }, Vec2::splat(10.0), FRAC_PI_4);
        assert!(diamond.intersects(&wall));
        let contact = resolve_contact(&diamond, &wall).unwrap();
        assert_eq!(contact.edge_owner, ContactSide::Second);
        assert_eq!(contact.normal(), Vec2::up());
        assert!((contact.point.y - (16.0 - 200.0_f32.sqrt())).abs() < 1e-4);
    }
}
