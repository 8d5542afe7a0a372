pub mod chart;
pub mod config;
pub mod dispatcher;
pub mod error;
pub(crate) mod http;
pub mod logging;
pub mod polling;
pub mod sink;
pub mod source;

pub mod model {
    pub mod bar;
    pub mod order;
    pub mod signal;
}

pub mod indicator {
    pub mod ema;
    pub mod volatility;
}

pub mod strategy {
    pub mod ema_crossover;
}

pub mod yahoo {
    pub mod rest;
    pub mod types;
}

pub mod dhan {
    pub mod rest;
    pub mod types;
}
