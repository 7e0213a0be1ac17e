// Proxy endpoints: validate inbound input, forward it through the backend
// gateway, and answer with the upstream body or a `{error}` object.

pub mod form;
pub mod handlers;
