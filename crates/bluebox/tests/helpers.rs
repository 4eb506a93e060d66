//! Test helpers: an in-memory transport that records every request

#![allow(dead_code)]

use bluebox::{Bluebox, Config, DeviceInfo, Error, Result, Transport};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

/// One transfer as seen by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ControlWrite {
        request: u8,
        value: u16,
        index: u16,
        data: Vec<u8>,
        timeout: Duration,
    },
    ControlRead {
        request: u8,
        value: u16,
        index: u16,
        length: usize,
        timeout: Duration,
    },
    BulkWrite {
        endpoint: u8,
        data: Vec<u8>,
        timeout: Option<Duration>,
    },
    BulkRead {
        endpoint: u8,
        max_length: usize,
        timeout: Option<Duration>,
    },
}

/// Shared view of what the mock transport did.
#[derive(Debug, Default)]
pub struct MockState {
    pub calls: Vec<Call>,
    /// Responses handed out by `control_read`, oldest first.
    pub read_responses: VecDeque<Vec<u8>>,
    /// Responses handed out by `bulk_read`, oldest first.
    pub bulk_responses: VecDeque<Vec<u8>>,
    /// When set, every control transfer fails with this error.
    pub fail_control: Option<rusb::Error>,
}

#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    pub state: Rc<RefCell<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_read(&self, bytes: &[u8]) {
        self.state
            .borrow_mut()
            .read_responses
            .push_back(bytes.to_vec());
    }

    pub fn push_bulk(&self, bytes: &[u8]) {
        self.state
            .borrow_mut()
            .bulk_responses
            .push_back(bytes.to_vec());
    }

    pub fn fail_control_with(&self, error: rusb::Error) {
        self.state.borrow_mut().fail_control = Some(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }
}

impl Transport for MockTransport {
    fn control_write(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        data: &[u8],
        timeout: Duration,
    ) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::ControlWrite {
            request,
            value,
            index,
            data: data.to_vec(),
            timeout,
        });
        match state.fail_control {
            Some(source) => Err(Error::Transfer { request, source }),
            None => Ok(()),
        }
    }

    fn control_read(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        length: usize,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::ControlRead {
            request,
            value,
            index,
            length,
            timeout,
        });
        if let Some(source) = state.fail_control {
            return Err(Error::Transfer { request, source });
        }
        Ok(state
            .read_responses
            .pop_front()
            .unwrap_or_else(|| vec![0; length]))
    }

    fn bulk_write(
        &mut self,
        endpoint: u8,
        data: &[u8],
        timeout: Option<Duration>,
    ) -> Result<usize> {
        self.state.borrow_mut().calls.push(Call::BulkWrite {
            endpoint,
            data: data.to_vec(),
            timeout,
        });
        Ok(data.len())
    }

    fn bulk_read(
        &mut self,
        endpoint: u8,
        max_length: usize,
        timeout: Option<Duration>,
    ) -> Result<Vec<u8>> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::BulkRead {
            endpoint,
            max_length,
            timeout,
        });
        match state.bulk_responses.pop_front() {
            Some(mut bytes) => {
                bytes.truncate(max_length);
                Ok(bytes)
            }
            None => Err(Error::Bulk {
                endpoint,
                source: rusb::Error::Timeout,
            }),
        }
    }
}

pub fn device_info() -> DeviceInfo {
    DeviceInfo {
        manufacturer: "AAUSAT3".to_string(),
        product: "BlueBox".to_string(),
        serial: "00001".to_string(),
    }
}

/// A controller over a fresh mock, plus a handle to inspect the mock.
pub fn mock_bluebox() -> (Bluebox<MockTransport>, MockTransport) {
    mock_bluebox_with(Config::default())
}

pub fn mock_bluebox_with(config: Config) -> (Bluebox<MockTransport>, MockTransport) {
    let transport = MockTransport::new();
    let probe = transport.clone();
    (
        Bluebox::from_transport(transport, device_info(), config),
        probe,
    )
}
