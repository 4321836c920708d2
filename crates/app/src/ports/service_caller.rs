//! Service caller port — delivery of commands to host entities.

use std::future::Future;

use climate_group_domain::error::ClimateGroupError;
use climate_group_domain::service::ServiceCall;

/// Sends service calls through the host.
pub trait ServiceCaller: Send + Sync {
    /// Deliver `call` and wait until the host reports completion.
    ///
    /// Delivery failures are returned as is; callers do not retry.
    fn call_service(
        &self,
        call: ServiceCall,
    ) -> impl Future<Output = Result<(), ClimateGroupError>> + Send;
}

impl<T: ServiceCaller> ServiceCaller for std::sync::Arc<T> {
    fn call_service(
        &self,
        call: ServiceCall,
    ) -> impl Future<Output = Result<(), ClimateGroupError>> + Send {
        (**self).call_service(call)
    }
}
