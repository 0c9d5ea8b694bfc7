// Crate entry point. Re-export modules so tests and binaries can import them easily.
//
// Responsibilities
// - Only declare and expose modules. No business logic here.
//
// How it is used
// - The api binary wires the shell modules together.
// - Tests import modules from this crate root to reach the code under test.

pub mod core {
    pub mod clock;
    pub mod leave;
    pub mod ports;
}

pub mod application {
    pub mod dispatcher;
    pub mod errors;
    pub mod event_handlers {
        pub mod leave_approved_handler;
        pub mod leave_approved_v2_handler;
        pub mod leave_reverted_handler;
    }
}

pub mod adapters {
    pub mod in_memory {
        pub mod in_memory_calendar;
        pub mod in_memory_correlation_store;
        pub mod manual_clock;
    }
    pub mod outbound {
        pub mod lark_calendar;
        pub mod redis_correlation_store;
        pub mod tenant_token;
    }
    pub mod inbound {
        pub mod crypto;
        pub mod envelope;
        pub mod webhook;
    }
}

pub mod shell {
    pub mod config;
    pub mod http;
    pub mod state;
    pub mod telemetry;
}
