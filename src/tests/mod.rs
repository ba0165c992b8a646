mod common;

mod data_endpoints;
