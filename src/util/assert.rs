pub fn assert_type<T>(_: &T) {}

#[allow(unused_macros)]
macro_rules! current_location {
    () => {
        format!("{}:{}", file!(), line!())
    };
}
#[allow(unused_imports)]
pub(crate) use current_location;

#[allow(unused_macros)]
macro_rules! check {
    ($lhs:expr) => {{
        let value = $lhs;
        $crate::util::assert::assert_type::<bool>(&value);
        if !value {
            panic!(
                "check failed: {}: {}",
                $crate::util::assert::current_location!(),
                stringify!($lhs),
            );
        }
    }};
    ($lhs:expr, $($msg:tt)+) => {{
        let value = $lhs;
        $crate::util::assert::assert_type::<bool>(&value);
        if !value {
            panic!(
                "check failed: {}: {}: {}",
                $crate::util::assert::current_location!(),
                stringify!($lhs),
                format!($($msg)+),
            );
        }
    }};
}
#[allow(unused_imports)]
pub(crate) use check;

#[allow(unused_macros)]
macro_rules! check_false {
    ($lhs:expr) => {{
        let value = $lhs;
        $crate::util::assert::assert_type::<bool>(&value);
        if value {
            panic!(
                "check failed: {}: !{}",
                $crate::util::assert::current_location!(),
                stringify!($lhs),
            );
        }
    }};
}
#[allow(unused_imports)]
pub(crate) use check_false;

#[cfg(test)]
mod tests {
    #[test]
    fn check_passes_silently() {
        check!(1 + 1 == 2);
        check_false!(1 + 1 == 3);
    }

    #[test]
    fn check_evaluates_its_argument_once() {
        let mut calls = 0;
        let mut next = || {
            calls += 1;
            calls == 1
        };
        check!(next());
        check!(!next(), "second call");
        assert_eq!(calls, 2);

        let mut calls = 0;
        check_false!({
            calls += 1;
            calls > 1
        });
        assert_eq!(calls, 1);
    }

    #[test]
    #[should_panic(expected = "check failed")]
    fn check_false_panics_on_true() {
        check_false!(2 > 1);
    }

    #[test]
    #[should_panic(expected = "not collidable")]
    fn check_with_message() {
        let collidable = false;
        check!(collidable, "node {} is not collidable", 7);
    }
}
