// Random demo data for populating an empty database

use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::bookings::capacity::minimum_rooms;
use crate::bookings::NewBooking;
use crate::error::DataError;

const MALE_FIRST_NAMES: &[&str] = &[
    "Albert", "Andrew", "Anthony", "Ben", "Bernd", "Bob", "Brian", "Charles", "Christian",
    "Christopher", "Claus", "Constantin", "Daniel", "David", "Dennis", "Dieter", "Donald", "Dylan",
    "Eliah", "Erik", "Felix", "Finn", "Frank", "Geoffrey", "Gregory", "Gustav", "Hank", "Hans",
    "Heinz", "Henry", "Ian", "Ingo", "Jack", "Jake", "James", "Johannes", "John", "Joos", "Joseph",
    "Judson", "Kevin", "Klaus", "Lars", "Liam", "Ludwig", "Lukas", "Luke", "Manfred", "Marco",
    "Mark", "Martin", "Matthew", "Maximilian", "Michael", "Nate", "Nathan", "Nico", "Norbert",
    "Oliver", "Oscar", "Otto", "Patrick", "Paul", "Peter", "Quincy", "Quinn", "Raphael", "Richard",
    "Robert", "Ronald", "Rudolf", "Sam", "Sebastian", "Seth", "Simon", "Steve", "Steven", "Theodor",
    "Thomas", "Timothy", "Tobias", "Tom", "Ulrich", "Ulysses", "Uwe", "Valentin", "Viktor", "Vince",
    "Walter", "Werner", "William", "Wolfgang", "Xander", "Xaver", "Xavier", "Yannick", "Yves",
    "Zach", "Zacharias", "Zane", "Zeno", "Zoltan",
];

const FEMALE_FIRST_NAMES: &[&str] = &[
    "Alice", "Amanda", "Amelie", "Anastasia", "Anna", "Ashley", "Ava", "Barbara", "Cathy",
    "Charlotte", "Chiara", "Christina", "Clara", "Diana", "Elena", "Elianne", "Elisabeth",
    "Elizabeth", "Emilia", "Emily", "Emma", "Eva", "Eve", "Fiona", "Frederike", "Frieda",
    "Gabrielle", "Gina", "Giselle", "Grace", "Greta", "Hanna", "Helena", "Helene", "Irene", "Iris",
    "Isabelle", "Ivy", "Jasmin", "Jennifer", "Jenny", "Jessica", "Johanna", "Julia", "Juliette",
    "Kara", "Katharina", "Katie", "Kimberly", "Klara", "Lara", "Larissa", "Laura", "Lena", "Lisa",
    "Maila", "Mandy", "Maren", "Maria", "Marie", "Mathilda", "Melissa", "Mia", "Michelle", "Molly",
    "Nadine", "Natalie", "Nicole", "Nina", "Nora", "Olive", "Olivia", "Pamela", "Paula", "Pauline",
    "Rachel", "Rebecca", "Rike", "Rita", "Rosa", "Rosalie", "Rose", "Sabrina", "Sara", "Saskia",
    "Sophia", "Sophie", "Stephanie", "Susan", "Tabea", "Tara", "Theresa", "Tiffany", "Tina", "Uma",
    "Valerie", "Vanessa", "Victoria", "Vivian", "Wendy", "Yara", "Yvonne", "Zara", "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Bach", "Bachmann", "Bachmeier", "Baker", "Bauer", "Baumann", "Beck", "Becker", "Bennett",
    "Beyer", "Black", "Brooks", "Brown", "Carter", "Clark", "Cook", "Cooper", "Davis", "Evans",
    "Fisher", "Fuchs", "Gray", "Grayson", "Green", "Hall", "Harrison", "Henderson", "Hill",
    "Hoffmann", "Hudson", "James", "Johnson", "Jones", "Kaiser", "Kelly", "King", "Koch", "Krause",
    "Lang", "Lee", "Lehmann", "Meier", "Meyer", "Miller", "Mitchell", "Morgan", "Muller", "Murphy",
    "Neumann", "Owens", "Parker", "Reed", "Reiter", "Richter", "Ross", "Ruescher", "Schmidt",
    "Schmitz", "Schneider", "Schreiber", "Schulz", "Schumacher", "Schuster", "Smith", "Spencer",
    "Staub", "Steiner", "Taylor", "Thomas", "Wagner", "Watson", "Weber", "Wentlandt", "White",
    "Williams", "Wilson", "Wood", "Wyler", "Zeder", "Zederbauer", "Zehnder", "Zeller", "Zellweger",
    "Ziegler", "Zimmer", "Zimmerman",
];

/// Consecutive duplicate draws tolerated before giving up
const MAX_CONSECUTIVE_DUPLICATES: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedVisitor {
    pub firstname: String,
    pub lastname: String,
    pub gender: Gender,
}

/// `count` distinct first/last name pairs, alternating male and female first names
pub fn generate_visitor_names<R: Rng + ?Sized>(
    count: usize,
    rng: &mut R,
) -> Result<Vec<GeneratedVisitor>, DataError> {
    if count > 10_000 {
        return Err(DataError::invalid(
            "numberOfVisitors must be less than or equal to 10000",
        ));
    }
    if count < 2 {
        return Err(DataError::invalid("numberOfVisitors must be greater than 1"));
    }

    let mut seen = HashSet::with_capacity(count);
    let mut visitors = Vec::with_capacity(count);
    let mut duplicates = 0;

    while visitors.len() < count {
        let (pool, gender) = if visitors.len() % 2 == 0 {
            (MALE_FIRST_NAMES, Gender::Male)
        } else {
            (FEMALE_FIRST_NAMES, Gender::Female)
        };
        let (Some(first), Some(last)) = (pool.choose(rng), LAST_NAMES.choose(rng)) else {
            break;
        };

        if seen.insert((*first, *last)) {
            duplicates = 0;
            visitors.push(GeneratedVisitor {
                firstname: first.to_string(),
                lastname: last.to_string(),
                gender,
            });
        } else {
            duplicates += 1;
            if duplicates > MAX_CONSECUTIVE_DUPLICATES {
                return Err(DataError::invalid(
                    "Failed to generate names, too many duplicates generated",
                ));
            }
        }
    }

    Ok(visitors)
}

/// Consecutive stays for one visitor starting on or after `start`
///
/// Each stay begins 0 to 14 days after the previous checkout and lasts 1 to
/// 21 nights. Rooms follow the capacity rule and the nightly rate is drawn
/// between 10.00 and 800.00.
pub fn generate_bookings<R: Rng + ?Sized>(
    visitor_id: i64,
    hotel_ids: &[i64],
    min_bookings: u32,
    max_bookings: u32,
    start: NaiveDate,
    rng: &mut R,
) -> Result<Vec<NewBooking>, DataError> {
    if min_bookings > max_bookings {
        return Err(DataError::invalid(
            "min_bookings must be less than or equal to max_bookings",
        ));
    }
    if min_bookings > 10 {
        return Err(DataError::invalid("min_bookings must be less than or equal to 10"));
    }
    if max_bookings < 1 {
        return Err(DataError::invalid("max_bookings must be greater than 0"));
    }
    if max_bookings > 20 {
        return Err(DataError::invalid("max_bookings must be less than or equal to 20"));
    }
    if hotel_ids.is_empty() {
        return Err(DataError::invalid("at least one hotel is required"));
    }

    let number = rng.gen_range(min_bookings..=max_bookings);
    let mut bookings = Vec::with_capacity(number as usize);
    let mut checkout = start;

    for _ in 0..number {
        let checkin = checkout + Duration::days(rng.gen_range(0..=14));
        let nights = rng.gen_range(1..=21);
        checkout = checkin + Duration::days(nights);

        let adults = rng.gen_range(1..=2);
        let kids = rng.gen_range(0..=4);
        let rooms = minimum_rooms(adults, kids, 0);
        let nightly = f64::from(rng.gen_range(1000..=80000)) / 100.0;
        let price = (nightly * nights as f64 * f64::from(rooms) * 100.0).ceil() / 100.0;

        let Some(hotel_id) = hotel_ids.choose(rng) else {
            break;
        };
        let mut booking = NewBooking::new(*hotel_id, visitor_id, checkin, checkout, adults);
        booking.kids = kids;
        booking.rooms = Some(rooms);
        booking.price = Some(price);
        bookings.push(booking);
    }

    Ok(bookings)
}
