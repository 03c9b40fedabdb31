mod logging;
mod schema;
mod utils;
