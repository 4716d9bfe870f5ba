pub mod models;

pub mod queries {
    pub mod audit;
    pub mod sessions;
    pub mod subscriptions;
}
