//! The logical operation table.
//!
//! Declared once at startup and validated there; read-only afterwards.
//! Variant order encodes the guess order: current API shape first, then
//! the plural/singular alternative, then legacy feedback-era paths.

use std::time::Duration;

use reqwest::Method;

use crate::config::TimeoutConfig;
use crate::executor::operation::{LogicalOperation, OperationError, Variant};

fn get(path: &str) -> Variant {
    Variant::new(Method::GET, path)
}

fn post(path: &str) -> Variant {
    Variant::new(Method::POST, path)
}

fn delete(path: &str) -> Variant {
    Variant::new(Method::DELETE, path)
}

/// Every logical operation the facade exposes.
#[derive(Debug, Clone)]
pub struct OperationTable {
    pub login: LogicalOperation,
    pub get_profile: LogicalOperation,
    pub list_surveys: LogicalOperation,
    pub create_survey: LogicalOperation,
    pub delete_survey: LogicalOperation,
    pub get_businesses: LogicalOperation,
    pub create_business: LogicalOperation,
}

impl OperationTable {
    /// Build the standard table. A definition error here is a programmer
    /// error and aborts startup.
    pub fn standard(timeouts: &TimeoutConfig) -> Result<Self, OperationError> {
        let request = Duration::from_secs(timeouts.request_secs);
        let bulk = Duration::from_secs(timeouts.bulk_secs);

        Ok(Self {
            login: LogicalOperation::new(
                "LOGIN",
                false,
                vec![post("/api/auth/login")],
                request,
            )?,
            get_profile: LogicalOperation::new(
                "GET_PROFILE",
                true,
                vec![get("/api/auth/profile"), get("/api/profile")],
                request,
            )?,
            list_surveys: LogicalOperation::new(
                "LIST_SURVEYS",
                true,
                vec![
                    get("/api/surveys"),
                    get("/api/survey"),
                    get("/api/feedbacks"),
                    get("/api/feedback"),
                ],
                bulk,
            )?,
            create_survey: LogicalOperation::new(
                "CREATE_SURVEY",
                false,
                vec![post("/api/survey"), post("/api/surveys")],
                request,
            )?,
            delete_survey: LogicalOperation::new(
                "DELETE_SURVEY",
                false,
                vec![
                    delete("/api/survey/{id}"),
                    delete("/api/surveys/{id}"),
                    delete("/api/feedback/{id}"),
                ],
                request,
            )?,
            get_businesses: LogicalOperation::new(
                "GET_BUSINESSES",
                true,
                vec![get("/api/businesses"), get("/api/business")],
                bulk,
            )?,
            create_business: LogicalOperation::new(
                "CREATE_BUSINESS",
                false,
                vec![post("/api/business"), post("/api/businesses")],
                request,
            )?,
        })
    }
}
