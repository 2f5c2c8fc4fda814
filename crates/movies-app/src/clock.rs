use time::{Date, OffsetDateTime};

/// Source of the evaluation date for validation rules
pub trait Clock: Send + Sync {
    fn today(&self) -> Date;
}

/// Current date in UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        OffsetDateTime::now_utc().date()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock(date!(2001 - 09 - 11));
        assert_eq!(clock.today(), date!(2001 - 09 - 11));
    }

    #[test]
    fn test_system_clock() {
        let today = SystemClock.today();
        let now = OffsetDateTime::now_utc().date();
        // might cross midnight between the two calls
        assert!(now - today <= time::Duration::days(1));
    }
}
