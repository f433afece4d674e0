//! 类型定义模块

mod connector;
mod session;

pub use connector::{
    ConnectorAuth, ConnectorInfo, FetchParams, FetchResultItem, LeadMetadata, OAuthCallback,
    SearchParams, SearchResponse, SearchResultItem, ToolDescriptor, ToolList,
};
pub use session::{PendingClaim, SessionRecord, SessionState};
