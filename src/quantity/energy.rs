use std::ops::Mul;

use crate::quantity::{cost::Cost, rate::KilowattHourRate};

quantity!(KilowattHours, "kWh");

impl Mul<KilowattHourRate> for KilowattHours {
    type Output = Cost;

    fn mul(self, rhs: KilowattHourRate) -> Self::Output {
        Cost(self.0 * rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_mul_rate() {
        assert_abs_diff_eq!((KilowattHours(12.5) * KilowattHourRate(4.0)).0, 50.0);
    }

    #[test]
    fn test_ordering() {
        assert_eq!(KilowattHours(3.0).min(KilowattHours(2.0)), KilowattHours(2.0));
        assert_eq!(KilowattHours(-1.0).max(KilowattHours::ZERO), KilowattHours::ZERO);
    }

    #[test]
    fn test_display_precision() {
        assert_eq!(format!("{:.3}", KilowattHours(1.5)), "1.500 kWh");
    }
}
