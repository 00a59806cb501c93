mod common;
mod evolution;
