// xe-core/src/units.rs

use uom::si::f64::{Length as UomLength, Time as UomTime};

// Public canonical unit types (SI, f64)
pub type Length = UomLength;
pub type Time = UomTime;

#[inline]
pub fn mm(v: f64) -> Length {
    use uom::si::length::millimeter;
    Length::new::<millimeter>(v)
}

#[inline]
pub fn hours(v: f64) -> Time {
    use uom::si::time::hour;
    Time::new::<hour>(v)
}

/// Length expressed in centimetres (attenuation coefficients are per cm).
#[inline]
pub fn in_cm(l: Length) -> f64 {
    use uom::si::length::centimeter;
    l.get::<centimeter>()
}

#[inline]
pub fn in_minutes(t: Time) -> f64 {
    use uom::si::time::minute;
    t.get::<minute>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millimetres_to_centimetres() {
        assert!((in_cm(mm(20.0)) - 2.0).abs() < 1e-12);
        assert!((in_cm(mm(0.5)) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn hours_to_minutes() {
        assert!((in_minutes(hours(0.2)) - 12.0).abs() < 1e-9);
    }
}
