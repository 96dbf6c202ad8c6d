//! The request client facade.
//!
//! The only surface the rest of the application depends on: one thin typed
//! method per logical operation, all delegating to the fallback executor.

use std::sync::Arc;

use serde_json::{json, Value};
use thiserror::Error;

use crate::client::credentials::CredentialStore;
use crate::client::operations::OperationTable;
use crate::config::ClientConfig;
use crate::endpoint::probe::EndpointProbe;
use crate::endpoint::registry::CandidateRegistry;
use crate::endpoint::resolver::EndpointResolver;
use crate::error::{ApiError, ApiResult};
use crate::executor::executor::FallbackRequestExecutor;
use crate::executor::operation::LogicalOperation;
use crate::health::monitor::HealthMonitor;
use crate::routing::RoleNamespace;

/// Errors building a client at startup.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("no usable endpoint candidates in configuration")]
    NoCandidates,

    #[error(transparent)]
    Operation(#[from] crate::executor::operation::OperationError),
}

/// Facade over the resilient request path.
pub struct RequestClient {
    executor: FallbackRequestExecutor,
    operations: OperationTable,
    credentials: Arc<dyn CredentialStore>,
    resolver: Arc<EndpointResolver>,
    monitor: Arc<HealthMonitor>,
}

impl RequestClient {
    /// Wire up the full access layer from a validated configuration.
    pub fn from_config(
        config: &ClientConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ClientBuildError> {
        let registry = Arc::new(
            CandidateRegistry::from_config(&config.endpoints)
                .ok_or(ClientBuildError::NoCandidates)?,
        );
        let resolver = Arc::new(EndpointResolver::new(
            registry,
            EndpointProbe::new(&config.probe),
            &config.probe,
        ));
        let monitor = Arc::new(HealthMonitor::new(Arc::clone(&resolver), &config.health));
        let executor =
            FallbackRequestExecutor::new(Arc::clone(&resolver), &config.retries, &config.health);
        let operations = OperationTable::standard(&config.timeouts)?;

        Ok(Self {
            executor,
            operations,
            credentials,
            resolver,
            monitor,
        })
    }

    /// The resolver owning this client's connection state.
    pub fn resolver(&self) -> &Arc<EndpointResolver> {
        &self.resolver
    }

    /// The health monitor bound to this client.
    pub fn monitor(&self) -> &Arc<HealthMonitor> {
        &self.monitor
    }

    fn role(&self) -> RoleNamespace {
        self.credentials
            .role()
            .map(|role| RoleNamespace::from_role(&role))
            .unwrap_or(RoleNamespace::Default)
    }

    async fn run(&self, operation: &LogicalOperation, body: Option<&Value>) -> ApiResult<Value> {
        let token = self.credentials.token();
        let result = self
            .executor
            .execute(operation, self.role(), body, token.as_deref())
            .await;

        // A rejected token is reported to the credential store, never
        // swallowed: the error still reaches the caller.
        if let Err(err) = &result {
            if err.is_unauthorized() {
                tracing::warn!(
                    operation = operation.name,
                    "Backend rejected the stored token, clearing credentials"
                );
                self.credentials.clear_token();
            }
        }
        result
    }

    /// Authenticate and store the returned session token and role.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<Value> {
        let body = json!({ "username": username, "password": password });
        let payload = self.run(&self.operations.login, Some(&body)).await?;

        let token = payload
            .get("token")
            .or_else(|| payload.get("accessToken"))
            .and_then(Value::as_str);
        if let Some(token) = token {
            let role = payload.get("role").and_then(Value::as_str).map(str::to_owned);
            self.credentials.store(token.to_string(), role);
        } else {
            tracing::warn!("Login succeeded but the payload carried no token");
        }
        Ok(payload)
    }

    pub async fn get_profile(&self) -> ApiResult<Value> {
        self.run(&self.operations.get_profile, None).await
    }

    pub async fn list_surveys(&self) -> ApiResult<Value> {
        self.run(&self.operations.list_surveys, None).await
    }

    pub async fn create_survey(&self, survey: &Value) -> ApiResult<Value> {
        self.run(&self.operations.create_survey, Some(survey)).await
    }

    pub async fn delete_survey(&self, id: &str) -> ApiResult<Value> {
        let operation = self
            .operations
            .delete_survey
            .bind(&[("id", id)])
            .map_err(ApiError::from)?;
        self.run(&operation, None).await
    }

    pub async fn list_businesses(&self) -> ApiResult<Value> {
        self.run(&self.operations.get_businesses, None).await
    }

    pub async fn create_business(&self, business: &Value) -> ApiResult<Value> {
        self.run(&self.operations.create_business, Some(business))
            .await
    }
}
