//! Operator sessions.
//!
//! [`Sessions`] tracks which authenticated operators are online. Credential
//! checks are delegated to an injected [`AuthProvider`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use pump::activity::ActivityCategory;
use pump::auth::{AuthError, AuthProvider, Operator};
use pump::config::OperatorSpec;
use pump::event::{EventSink, FleetEvent, PresenceChange};
use tracing::{info, warn};

use crate::activity::ActivityLog;

/// Provider backed by the `[[operators]]` table of the station config.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthProvider {
    operators: HashMap<String, OperatorSpec>,
}

impl StaticAuthProvider {
    /// Build from configured operators. A repeated id keeps the last entry.
    pub fn new(operators: &[OperatorSpec]) -> Self {
        Self {
            operators: operators
                .iter()
                .map(|op| (op.employee_id.clone(), op.clone()))
                .collect(),
        }
    }

    /// Number of known operators.
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// Whether no operator can log in.
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

impl AuthProvider for StaticAuthProvider {
    fn authenticate(&self, employee_id: &str, password: &str) -> Result<Operator, AuthError> {
        let spec = self
            .operators
            .get(employee_id)
            .filter(|spec| spec.password == password)
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(Operator {
            employee_id: spec.employee_id.clone(),
            name: spec.name.clone(),
            role: spec.role,
            department: spec.department.clone(),
            position: spec.position.clone(),
            login_time: Utc::now(),
        })
    }
}

/// Online operator table keyed by transport session id.
pub struct Sessions {
    provider: Box<dyn AuthProvider>,
    online: RwLock<HashMap<String, Operator>>,
    activity: Arc<ActivityLog>,
    sink: Arc<dyn EventSink>,
}

impl Sessions {
    /// Create an empty table.
    pub fn new(
        provider: Box<dyn AuthProvider>,
        activity: Arc<ActivityLog>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            provider,
            online: RwLock::new(HashMap::new()),
            activity,
            sink,
        }
    }

    /// Authenticate and mark the session online.
    ///
    /// Logging in again on the same session replaces the previous operator.
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidCredentials`] when the provider rejects
    /// the credentials; nothing is recorded in that case.
    pub fn login(
        &self,
        session_id: &str,
        employee_id: &str,
        password: &str,
    ) -> Result<Operator, AuthError> {
        let operator = match self.provider.authenticate(employee_id, password) {
            Ok(operator) => operator,
            Err(e) => {
                warn!("Rejected login for {:?} on session {}", employee_id, session_id);
                return Err(e);
            }
        };

        let users_online = {
            let mut online = self.online.write();
            online.insert(session_id.to_string(), operator.clone());
            online.len()
        };

        info!("{} logged in ({} online)", operator.name, users_online);
        self.activity.append(
            format!("{} logged in", operator.name),
            &operator.employee_id,
            ActivityCategory::Info,
            None,
        );
        self.emit(FleetEvent::UserConnected(PresenceChange {
            user: operator.clone(),
            users_online,
        }));
        Ok(operator)
    }

    /// Mark the session offline.
    ///
    /// # Errors
    /// Returns [`AuthError::UnknownSession`] if the session is not logged in.
    pub fn logout(&self, session_id: &str) -> Result<Operator, AuthError> {
        let (operator, users_online) = {
            let mut online = self.online.write();
            let operator = online
                .remove(session_id)
                .ok_or_else(|| AuthError::UnknownSession(session_id.to_string()))?;
            (operator, online.len())
        };

        info!("{} logged out ({} online)", operator.name, users_online);
        self.emit(FleetEvent::UserDisconnected(PresenceChange {
            user: operator.clone(),
            users_online,
        }));
        Ok(operator)
    }

    /// Number of sessions logged in.
    pub fn online_count(&self) -> usize {
        self.online.read().len()
    }

    /// Operators currently online.
    pub fn online(&self) -> Vec<Operator> {
        self.online.read().values().cloned().collect()
    }

    fn emit(&self, event: FleetEvent) {
        let name = event.name();
        if let Err(e) = self.sink.publish(event) {
            warn!("Failed to publish {}: {}", name, e);
        }
    }
}
