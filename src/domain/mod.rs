//! Request and response values of the CEP → weather pipeline.

pub mod cep;
pub mod weather;

pub use cep::{is_valid_cep, CepPayload, CepRequest, PostalCode};
pub use weather::{celsius_to_fahrenheit, celsius_to_kelvin, WeatherResult};
