pub mod control_client;
