// Read-side aggregates for the three audiences: collaborator, company, admin.

pub mod aggregate;
pub mod handlers;
