// Room capacity and stay pricing for bookings

/// Minimum number of rooms needed for a party
///
/// Two adults, four kids or eight babies fill one room, and partial rooms
/// round up: `ceil(adults/2 + kids/4 + babies/8)`. Computed in eighths so no
/// floating point is involved.
pub fn minimum_rooms(adults: i32, kids: i32, babies: i32) -> i32 {
    let eighths = 4 * adults + 2 * kids + babies;
    (eighths + 7).div_euclid(8)
}

/// Price of a stay when the caller does not supply one
pub fn stay_price(price_per_night: f64, nights: i64, rooms: i32) -> f64 {
    price_per_night * nights as f64 * f64::from(rooms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_rooms_couple_with_kid() {
        assert_eq!(minimum_rooms(2, 1, 0), 2);
    }

    #[test]
    fn test_minimum_rooms_couple() {
        assert_eq!(minimum_rooms(2, 0, 0), 1);
    }

    #[test]
    fn test_minimum_rooms_single_adult() {
        assert_eq!(minimum_rooms(1, 0, 0), 1);
    }

    #[test]
    fn test_minimum_rooms_babies_share() {
        assert_eq!(minimum_rooms(2, 0, 8), 2);
        assert_eq!(minimum_rooms(1, 1, 2), 1);
        assert_eq!(minimum_rooms(1, 2, 2), 2);
    }

    #[test]
    fn test_minimum_rooms_large_party() {
        assert_eq!(minimum_rooms(10, 10, 10), 9);
        assert_eq!(minimum_rooms(2, 4, 0), 2);
    }

    #[test]
    fn test_stay_price() {
        assert_eq!(stay_price(100.0, 2, 1), 200.0);
        assert_eq!(stay_price(150.0, 3, 2), 900.0);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// The integer form agrees with the real-valued ceiling
    #[test]
    fn prop_minimum_rooms_matches_ceiling() {
        proptest!(|(
            adults in 1i32..=10,
            kids in 0i32..=10,
            babies in 0i32..=10
        )| {
            let expected = (adults as f64 / 2.0 + kids as f64 / 4.0 + babies as f64 / 8.0).ceil();
            prop_assert_eq!(minimum_rooms(adults, kids, babies), expected as i32);
        });
    }

    /// Adding a guest never lowers the room count
    #[test]
    fn prop_minimum_rooms_is_monotonic() {
        proptest!(|(
            adults in 1i32..=9,
            kids in 0i32..=9,
            babies in 0i32..=9
        )| {
            let base = minimum_rooms(adults, kids, babies);
            prop_assert!(minimum_rooms(adults + 1, kids, babies) >= base);
            prop_assert!(minimum_rooms(adults, kids + 1, babies) >= base);
            prop_assert!(minimum_rooms(adults, kids, babies + 1) >= base);
        });
    }

    /// Every party of at least one adult needs a room
    #[test]
    fn prop_minimum_rooms_at_least_one() {
        proptest!(|(
            adults in 1i32..=10,
            kids in 0i32..=10,
            babies in 0i32..=10
        )| {
            prop_assert!(minimum_rooms(adults, kids, babies) >= 1);
        });
    }
}
