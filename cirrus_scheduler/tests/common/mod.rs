use ::std::{num::NonZeroUsize, time::Duration};

use ::cirrus_common::{
    error::*,
    executor::ExecutorLocation,
    kvs::KvsClient,
    lattice::LatticeValue,
};
use ::cirrus_scheduler::{
    executor::{ExecutorClient, PinAcceptor, PinSender},
    get_server,
    scheduler::{PlacementOptions, Scheduler},
};
use ::mockall::mock;
use axum_test::TestServer;

mock! {
    pub Kvs{}
    impl KvsClient for Kvs {
        async fn put(&self, key: &str, value: LatticeValue) -> Result<()>;
        async fn get(&self, key: &str) -> Result<Option<LatticeValue>>;
    }
}

mock! {
    pub Executors{}
    impl ExecutorClient for Executors {
        async fn send_pin(&self, location: &ExecutorLocation, message: String) -> Result<()>;
        fn send_unpin(&self, location: &ExecutorLocation, function: &str);
    }
}

pub const PIN_TIMEOUT: Duration = Duration::from_millis(50);
pub const SCHEDULER_IP: &str = "127.0.0.1";

pub fn placement_options(pin_timeout: Duration) -> PlacementOptions {
    PlacementOptions {
        ip: SCHEDULER_IP.to_owned(),
        pin_timeout,
        default_num_replicas: NonZeroUsize::new(2).unwrap(),
    }
}

pub async fn get_test_server(
    kvs: MockKvs,
    executors: MockExecutors,
    pin_sender: PinSender,
    pin_acceptor: PinAcceptor,
    pin_timeout: Duration,
) -> Result<TestServer> {
    let scheduler = Scheduler::new(kvs, executors, pin_acceptor, placement_options(pin_timeout));
    let app = get_server(scheduler, pin_sender)?;
    TestServer::new(app).map_err(CirrusError::fail_to_start_server)
}

pub async fn register_executors(server: &TestServer, locations: &[ExecutorLocation]) {
    for location in locations {
        server.post("/executor").json(location).await.assert_status_ok();
    }
}
