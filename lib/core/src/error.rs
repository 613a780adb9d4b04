//! Error handling foundation for gatehouse.
//!
//! Every crate returns `rootcause::Report<E>` wrapped in [`Result`], where
//! `E` is that crate's own error enum. Callers attach their own context as
//! the report travels up towards the HTTP layer.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Unreachable {
        host: &'static str,
    }

    impl fmt::Display for Unreachable {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{} is unreachable", self.host)
        }
    }

    impl std::error::Error for Unreachable {}

    fn connect(host: &'static str) -> Result<(), Unreachable> {
        Err(Unreachable { host }.into())
    }

    #[test]
    fn report_wraps_domain_error() {
        let report = connect("api.github.com").expect_err("must fail");
        assert!(report.to_string().contains("api.github.com is unreachable"));
    }

    #[test]
    fn question_mark_lifts_domain_error() {
        fn outer() -> Result<(), Unreachable> {
            let reachable: std::result::Result<(), Unreachable> =
                Err(Unreachable { host: "youtube" });
            reachable?;
            Ok(())
        }
        assert!(outer().is_err());
    }
}
