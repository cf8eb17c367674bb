// src/schema/mod.rs

pub mod types;

pub use types::{Column, VarType};

const fn col(name: &'static str, description: &'static str, ty: VarType) -> Column {
    Column {
        name,
        description,
        ty,
    }
}

/// The 27 columns requested from BTS, in header order.
pub const COLUMNS: [Column; 27] = [
    col("FL_DATE", "FlightDate", VarType::Char),
    col("UNIQUE_CARRIER", "UniqueCarrier", VarType::Char),
    col("AIRLINE_ID", "AirlineID", VarType::Num),
    col("CARRIER", "Carrier", VarType::Char),
    col("FL_NUM", "FlightNum", VarType::Char),
    col("ORIGIN_AIRPORT_ID", "OriginAirportID", VarType::Num),
    col("ORIGIN_AIRPORT_SEQ_ID", "OriginAirportSeqID", VarType::Num),
    col("ORIGIN_CITY_MARKET_ID", "OriginCityMarketID", VarType::Num),
    col("ORIGIN", "Origin", VarType::Char),
    col("DEST_AIRPORT_ID", "DestAirportID", VarType::Num),
    col("DEST_AIRPORT_SEQ_ID", "DestAirportSeqID", VarType::Num),
    col("DEST_CITY_MARKET_ID", "DestCityMarketID", VarType::Num),
    col("DEST", "Dest", VarType::Char),
    col("CRS_DEP_TIME", "CRSDepTime", VarType::Char),
    col("DEP_TIME", "DepTime", VarType::Char),
    col("DEP_DELAY", "DepDelay", VarType::Num),
    col("TAXI_OUT", "TaxiOut", VarType::Num),
    col("WHEELS_OFF", "WheelsOff", VarType::Char),
    col("WHEELS_ON", "WheelsOn", VarType::Char),
    col("TAXI_IN", "TaxiIn", VarType::Num),
    col("CRS_ARR_TIME", "CRSArrTime", VarType::Char),
    col("ARR_TIME", "ArrTime", VarType::Char),
    col("ARR_DELAY", "ArrDelay", VarType::Num),
    col("CANCELLED", "Cancelled", VarType::Num),
    col("CANCELLATION_CODE", "CancellationCode", VarType::Char),
    col("DIVERTED", "Diverted", VarType::Num),
    col("DISTANCE", "Distance", VarType::Num),
];

/// Comma-joined column names. Doubles as the SQL projection and the header
/// every cleaned file must start with.
pub fn column_list() -> String {
    COLUMNS
        .iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(",")
}

/// Header line a cleaned extract must carry.
pub fn expected_header() -> String {
    column_list()
}
