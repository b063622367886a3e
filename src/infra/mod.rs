pub mod cohere;
