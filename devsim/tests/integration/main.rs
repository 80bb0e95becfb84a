// Integration tests follow the organization suggested by Matklad:
// https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod bench;
mod model_protocol;
mod port_chaining;
mod simulation_injection;
