//! Several tasks sharing one controller through `SharedPeci`.
mod helpers {
    include!("helpers/mod.rs");
}

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use helpers::{MockDelay, SimController};
use peci_bus::config::PeciConfig;
use peci_bus::core::{command, Request};
use peci_bus::protocol::completion::PolledCompletion;
use peci_bus::protocol::controller::PeciController;
use peci_bus::protocol::shared::SharedPeci;
use static_cell::StaticCell;
use tokio::time::{sleep, Duration};

static SIM: StaticCell<SimController> = StaticCell::new();

type Bus = PeciController<&'static SimController, MockDelay, PolledCompletion>;

#[tokio::test]
async fn transactions_never_interleave() {
    let sim: &'static SimController = SIM.init(SimController::new());
    sim.set_response(&[0x5C, 0x11, 0x22, 0x9F]);

    let shared: SharedPeci<NoopRawMutex, Bus> = SharedPeci::new(PeciController::new(
        sim,
        MockDelay::new(),
        PolledCompletion,
        PeciConfig::default(),
    )
    .unwrap());
    shared.configure(1_000).await.unwrap();
    shared.enable().await.unwrap();

    let mut bus = shared.lock().await;
    let first = async move {
        // The other task is parked on the mutex meanwhile.
        sleep(Duration::from_millis(5)).await;
        assert!(sim.frames().is_empty());

        let request = Request::builder(0x30, command::GET_TEMP)
            .read_length(2)
            .build()
            .unwrap();
        let result = bus.transfer(request).await;
        drop(bus);
        result
    };

    let second = async {
        let request = Request::builder(0x31, command::RD_PKG_CFG)
            .payload(&[0x00, 0x00, 0x00, 0x00])
            .read_length(2)
            .build()
            .unwrap();
        shared.transfer(request).await
    };

    let (a, b) = tokio::join!(first, second);

    assert_eq!(a.unwrap().as_slice(), &[0x11, 0x22]);
    assert_eq!(b.unwrap().as_slice(), &[0x11, 0x22]);
    assert_eq!(
        sim.frames(),
        vec![
            vec![0x30, 1, 2, command::GET_TEMP],
            vec![0x31, 5, 2, command::RD_PKG_CFG, 0, 0, 0, 0],
        ]
    );

    shared.disable().await.unwrap();
    let peci = shared.into_inner();
    assert_eq!(peci.bitrate(), 1_000);
}
