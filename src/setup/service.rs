use chrono::{Duration, Local};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::bookings::{BookingService, NewBooking};
use crate::error::DataError;
use crate::hotels::{HotelInput, HotelService};
use crate::manage::DataContext;
use crate::setup::generators::{generate_bookings, generate_visitor_names};
use crate::storage::{Predicate, Table};
use crate::validation::Flag;
use crate::visitors::{VisitorInput, VisitorService};

/// Demo hotels: name, country, nightly rate
const DEMO_HOTELS: &[(&str, &str, f64)] = &[
    ("Contoso Hotel Zurich", "Switzerland", 400.0),
    ("Contoso Hotel Paris", "France", 200.0),
    ("Contoso Hotel London", "United Kingdom", 250.0),
    ("Contoso Hotel Berlin", "Germany", 150.0),
    ("Contoso Hotel Chicago", "United States", 300.0),
    ("Contoso Hotel Los Angeles", "United States", 350.0),
];

const DEMO_VISITORS: &[(&str, &str)] = &[
    ("Alice", "Smith"),
    ("Bob", "Jones"),
    ("Charlotte", "Brown"),
    ("David", "White"),
    ("Eve", "Black"),
    ("Frank", "Green"),
];

fn default_visitors() -> usize {
    100
}

fn default_min_bookings() -> u32 {
    1
}

fn default_max_bookings() -> u32 {
    5
}

/// Request body for POST /api/setup
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetupRequest {
    #[serde(default, alias = "drop_schema")]
    #[schema(value_type = bool)]
    pub drop_schema: Flag,
    #[serde(default, alias = "create_schema")]
    #[schema(value_type = bool)]
    pub create_schema: Flag,
    #[serde(default, alias = "populate_data")]
    #[schema(value_type = bool)]
    pub populate_data: Flag,
    #[serde(default = "default_visitors", alias = "number_of_visitors")]
    pub number_of_visitors: usize,
    #[serde(default = "default_min_bookings", alias = "min_bookings_per_visitor")]
    pub min_bookings_per_visitor: u32,
    #[serde(default = "default_max_bookings", alias = "max_bookings_per_visitor")]
    pub max_bookings_per_visitor: u32,
}

impl Default for SetupRequest {
    fn default() -> Self {
        Self {
            drop_schema: Flag(false),
            create_schema: Flag(false),
            populate_data: Flag(false),
            number_of_visitors: default_visitors(),
            min_bookings_per_visitor: default_min_bookings(),
            max_bookings_per_visitor: default_max_bookings(),
        }
    }
}

/// Which tables a setup step touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct TableReport {
    pub hotels: bool,
    pub visitors: bool,
    pub bookings: bool,
}

impl TableReport {
    fn mark(&mut self, table: Table) {
        match table {
            Table::Hotels => self.hotels = true,
            Table::Visitors => self.visitors = true,
            Table::Bookings => self.bookings = true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetupReport {
    pub success: bool,
    pub drop_schema: bool,
    pub create_schema: TableReport,
    pub populate_data: TableReport,
}

/// Schema lifecycle and demo data population
#[derive(Clone)]
pub struct SetupService {
    context: DataContext,
    hotels: HotelService,
    visitors: VisitorService,
    bookings: BookingService,
}

impl SetupService {
    pub fn new(context: DataContext) -> Self {
        Self {
            hotels: HotelService::new(context.clone()),
            visitors: VisitorService::new(context.clone()),
            bookings: BookingService::new(context.clone()),
            context,
        }
    }

    /// Runs the requested steps in order: drop, create, populate
    pub async fn setup(&self, request: &SetupRequest) -> Result<SetupReport, DataError> {
        if request.drop_schema.0 && !request.create_schema.0 {
            return Err(DataError::invalid(
                "dropSchema requires createSchema, the tables would be left missing",
            ));
        }

        let mut report = SetupReport::default();
        let storage = self.context.storage();

        if request.drop_schema.0 {
            let _guard = self.context.serialize_writes().await;
            storage.drop_tables().await?;
            tracing::info!("Dropped all tables");
            report.drop_schema = true;
        }

        if request.create_schema.0 {
            let _guard = self.context.serialize_writes().await;
            for table in Table::ALL {
                if !storage.table_exists(table).await? {
                    storage.create_table(table).await?;
                    tracing::info!("Created table {}", table);
                    report.create_schema.mark(table);
                }
            }
        }

        if request.populate_data.0 {
            for table in Table::ALL {
                if storage.count_matching(table, &Predicate::All).await? > 0 {
                    tracing::debug!("Table {} already has data, not populating", table);
                    continue;
                }
                match table {
                    Table::Hotels => self.populate_hotels().await,
                    Table::Visitors => self.populate_visitors(request.number_of_visitors).await?,
                    Table::Bookings => {
                        self.populate_bookings(
                            request.min_bookings_per_visitor,
                            request.max_bookings_per_visitor,
                        )
                        .await?
                    }
                }
                report.populate_data.mark(table);
            }
        }

        report.success = true;
        Ok(report)
    }

    async fn populate_hotels(&self) {
        for (index, (name, country, price)) in DEMO_HOTELS.iter().enumerate() {
            let input = HotelInput::new(*name, *price, 10)
                .with_id(index as i64 + 1)
                .with_country(*country);
            if let Err(e) = self.hotels.create_hotel(input).await {
                tracing::warn!("Skipping demo hotel {}: {}", name, e);
            }
        }
    }

    async fn populate_visitors(&self, count: usize) -> Result<(), DataError> {
        let generated = generate_visitor_names(count, &mut rand::thread_rng())?;

        let fixed = DEMO_VISITORS
            .iter()
            .map(|(first, last)| VisitorInput::new(*first, *last));
        let random = generated
            .into_iter()
            .map(|v| VisitorInput::new(v.firstname, v.lastname));

        let mut created = 0;
        for input in fixed.chain(random) {
            match self.visitors.create_visitor(input).await {
                Ok(_) => created += 1,
                Err(e) => tracing::warn!("Skipping demo visitor: {}", e),
            }
        }
        tracing::info!("Populated {} visitors", created);
        Ok(())
    }

    async fn populate_bookings(&self, min: u32, max: u32) -> Result<(), DataError> {
        let hotel_ids: Vec<i64> = self
            .hotels
            .get_hotels("", false)
            .await?
            .iter()
            .map(|h| h.hotel_id)
            .collect();
        let visitor_ids: Vec<i64> = self
            .visitors
            .get_visitors("", false)
            .await?
            .iter()
            .map(|v| v.visitor_id)
            .collect();

        if hotel_ids.is_empty() || visitor_ids.is_empty() {
            tracing::warn!("No hotels or visitors available, skipping demo bookings");
            return Ok(());
        }

        let today = Local::now().date_naive();
        let mut requests = Vec::new();

        // Two fixed stays for the oldest visitor in the oldest hotel
        if let (Some(&hotel_id), Some(&visitor_id)) = (hotel_ids.last(), visitor_ids.last()) {
            let mut family = NewBooking::new(
                hotel_id,
                visitor_id,
                today + Duration::days(10),
                today + Duration::days(14),
                2,
            );
            family.kids = 1;
            family.rooms = Some(2);
            family.price = Some(3900.0);
            requests.push(family);

            let mut couple = NewBooking::new(
                hotel_id,
                visitor_id,
                today + Duration::days(2),
                today + Duration::days(7),
                2,
            );
            couple.rooms = Some(1);
            couple.price = Some(1000.0);
            requests.push(couple);
        }

        {
            let mut rng = rand::thread_rng();
            for visitor_id in &visitor_ids {
                requests.extend(generate_bookings(
                    *visitor_id,
                    &hotel_ids,
                    min,
                    max,
                    today + Duration::days(1),
                    &mut rng,
                )?);
            }
        }

        let mut created = 0;
        for request in requests {
            match self.bookings.create_booking(request).await {
                Ok(_) => created += 1,
                Err(e) => tracing::warn!("Skipping demo booking: {}", e),
            }
        }
        tracing::info!("Populated {} bookings", created);
        Ok(())
    }
}
