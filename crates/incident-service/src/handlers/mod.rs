//! Request handlers
//!
//! One module per resource of the REST surface. Every handler takes the
//! [`RequestContext`](crate::RequestContext) of the request, identifies the
//! acting user, consults their ability and returns either the response view
//! or a status-mapped [`ServiceError`](crate::ServiceError).
//!
//! | Resource         | Operations                      |
//! |------------------|---------------------------------|
//! | incidents        | list, get, create, update, delete |
//! | users            | list, get, update               |
//! | report reasons   | list, create, delete            |
//! | audit logs       | list                            |

pub mod audit_logs;
pub mod incidents;
pub mod report_reasons;
pub mod users;

pub use audit_logs::AuditLogParams;
