// Endpoint methods, grouped by resource. Each file adds inherent methods
// to `ApiClient`.

mod attachments;
mod organizations;
mod projects;
mod releases;
mod teams;
