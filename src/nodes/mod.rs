//! Integration nodes
//!
//! Each node wraps one vendor API behind typed operations. A batch resolves
//! its `(resource, operation)` pair once, then runs the operation for every
//! input item through [`execute_batch`].
//!
//! | Node | Credential | Resources |
//! |------|------------|-----------|
//! | `ciscoWebex` | `ciscoWebexOAuth2Api` | message, meeting |
//! | `zoho` | `zohoOAuth2Api` | eight CRM modules |
//! | `tributech` | `tributechOAuth2Api` | status, value |

mod executor;
pub mod tributech;
mod types;
pub mod webex;
pub mod zoho;

pub use executor::{execute_batch, NodeRegistry, NodeRunner};
pub use tributech::{TributechNode, TributechOperation, ValueKind};
pub use types::{
    default_limit, parse_params, require, IntegrationNode, NodeContext, NodeDescription,
    OperationDescription, OptionValue, ResourceDescription,
};
pub use webex::{WebexNode, WebexOperation};
pub use zoho::{RecordAction, ZohoNode, ZohoOperation, ZohoResource};
