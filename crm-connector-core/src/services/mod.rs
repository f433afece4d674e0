//! 业务逻辑服务层

mod auth_service;
mod catalog;
mod lead_service;

pub use auth_service::{AuthService, AuthorizationRedirect, MAX_PENDING, PENDING_TTL_MINUTES};
pub use catalog::{CONNECTOR_ENDPOINTS, connector_info, tool_list};
pub use lead_service::{LeadService, SEARCH_LIMIT};
