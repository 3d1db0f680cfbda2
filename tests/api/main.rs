mod helpers;
mod spa;
mod store_postgres;
