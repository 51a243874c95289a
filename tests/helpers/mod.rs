//! Test doubles to simulate the K-line, the ECU behind it, the wake-up pin,
//! and a virtual microsecond clock during integration tests.
#![allow(dead_code)]

use embedded_hal::{
    delay::DelayNs,
    digital::{self, ErrorKind, ErrorType, OutputPin},
};
use kline_kds::protocol::transport::{
    frame::{checksum, request_length},
    traits::{kline_clock::KlineClock, serial_line::SerialLine},
};
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Time one byte spends on the wire at 10400 baud (rounded up).
pub const BYTE_TIME_US: u32 = 1_000;
/// Delay between the end of a request and the first response byte.
pub const ECU_REPLY_DELAY_US: u32 = 25_000;
/// Time the code under test spends per clock read.
pub const CLOCK_TICK_US: u32 = 10;

pub const ECU: u8 = 0x11;
pub const TESTER: u8 = 0xF1;

//==================================================================================BENCH
/// State shared by every simulated peripheral: current time and whether the
/// UART currently owns the line.
#[derive(Debug, Default)]
pub struct Bench {
    now: Cell<u32>,
    suspended: Cell<bool>,
}

impl Bench {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn starting_at(micros: u32) -> Rc<Self> {
        let bench = Self::default();
        bench.now.set(micros);
        Rc::new(bench)
    }

    pub fn now(&self) -> u32 {
        self.now.get()
    }

    pub fn advance_us(&self, micros: u32) {
        self.now.set(self.now.get().wrapping_add(micros));
    }

    pub fn advance_ms(&self, millis: u32) {
        self.advance_us(millis * 1_000);
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.get()
    }
}

//==================================================================================CLOCK
/// Virtual clock: every read costs [`CLOCK_TICK_US`], so polling loops make progress.
pub struct SimClock {
    bench: Rc<Bench>,
}

impl SimClock {
    pub fn new(bench: &Rc<Bench>) -> Self {
        Self {
            bench: Rc::clone(bench),
        }
    }
}

impl KlineClock for SimClock {
    fn now_micros(&mut self) -> u32 {
        self.bench.advance_us(CLOCK_TICK_US);
        self.bench.now()
    }
}

//==================================================================================LINE
/// How the simulated transceiver loops transmitted bytes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoMode {
    /// Every byte comes back unchanged.
    Faithful,
    /// The byte at `index` comes back as `value`.
    Corrupt { index: usize, value: u8 },
    /// Nothing comes back.
    Silent,
    /// The byte at `index` comes back unchanged, followed by `extra` one byte
    /// time later (collision with another node).
    Trailing { index: usize, extra: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimLineError {
    /// Write attempted while the UART was released for the wake-up pulse.
    Suspended,
    /// Read attempted with nothing available.
    Empty,
    /// The UART refused to hand over or take back the line.
    Refused,
}

/// Scripted reply sent by the ECU once a complete request has been written.
struct Reply {
    frames: Vec<Vec<u8>>,
    frame_gap_us: u32,
}

/// Half-duplex K-line with an ECU behind it.
pub struct SimLine {
    bench: Rc<Bench>,
    rx: VecDeque<(u32, u8)>,
    echo: EchoMode,
    replies: VecDeque<Reply>,
    current_request: Vec<u8>,
    pub written: Vec<u8>,
    pub write_times: Vec<u32>,
    pub suspend_count: usize,
    pub resume_count: usize,
    pub refuse_suspend: bool,
    pub refuse_resume: bool,
}

impl SimLine {
    pub fn new(bench: &Rc<Bench>) -> Self {
        Self {
            bench: Rc::clone(bench),
            rx: VecDeque::new(),
            echo: EchoMode::Faithful,
            replies: VecDeque::new(),
            current_request: Vec::new(),
            written: Vec::new(),
            write_times: Vec::new(),
            suspend_count: 0,
            resume_count: 0,
            refuse_suspend: false,
            refuse_resume: false,
        }
    }

    pub fn with_echo(mut self, echo: EchoMode) -> Self {
        self.echo = echo;
        self
    }

    /// Queue the ECU answer to the next complete request.
    pub fn reply_with(&mut self, frames: &[&[u8]]) {
        self.reply_with_gap(frames, 20_000);
    }

    /// Same as [`reply_with`](Self::reply_with) with a custom silence between frames.
    pub fn reply_with_gap(&mut self, frames: &[&[u8]], frame_gap_us: u32) {
        self.replies.push_back(Reply {
            frames: frames.iter().map(|f| f.to_vec()).collect(),
            frame_gap_us,
        });
    }

    /// Bytes arriving `delay_us` from now, one byte time apart.
    pub fn feed(&mut self, delay_us: u32, bytes: &[u8]) {
        let start = self.bench.now().wrapping_add(delay_us);
        self.schedule(start, bytes);
    }

    /// Received bytes not consumed yet (arrived or still in flight).
    pub fn unread(&self) -> usize {
        self.rx.len()
    }

    fn schedule(&mut self, start: u32, bytes: &[u8]) -> u32 {
        let mut at = start;
        for byte in bytes {
            self.rx.push_back((at, *byte));
            at = at.wrapping_add(BYTE_TIME_US);
        }
        at
    }

    fn arrived(&self, at: u32) -> bool {
        // Arrival times are close to `now`, so the wrapped difference is small.
        self.bench.now().wrapping_sub(at) < u32::MAX / 2
    }

    fn echo_for(&self, index: usize, byte: u8) -> Option<u8> {
        match self.echo {
            EchoMode::Faithful => Some(byte),
            EchoMode::Corrupt { index: bad, value } if bad == index => Some(value),
            EchoMode::Corrupt { .. } | EchoMode::Trailing { .. } => Some(byte),
            EchoMode::Silent => None,
        }
    }

    fn trailing_for(&self, index: usize) -> Option<u8> {
        match self.echo {
            EchoMode::Trailing { index: at, extra } if at == index => Some(extra),
            _ => None,
        }
    }

    fn maybe_answer(&mut self) {
        if request_length(&self.current_request) != Some(self.current_request.len()) {
            return;
        }
        self.current_request.clear();
        let Some(reply) = self.replies.pop_front() else {
            return;
        };
        let mut at = self
            .bench
            .now()
            .wrapping_add(BYTE_TIME_US + ECU_REPLY_DELAY_US);
        for frame in &reply.frames {
            at = self.schedule(at, frame).wrapping_add(reply.frame_gap_us);
        }
    }
}

impl SerialLine for SimLine {
    type Error = SimLineError;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        if self.bench.is_suspended() {
            return Err(SimLineError::Suspended);
        }
        let index = self.written.len();
        self.written.push(byte);
        self.write_times.push(self.bench.now());
        self.current_request.push(byte);

        if let Some(echo) = self.echo_for(index, byte) {
            let at = self.bench.now().wrapping_add(BYTE_TIME_US);
            self.rx.push_back((at, echo));
        }
        if let Some(extra) = self.trailing_for(index) {
            let at = self.bench.now().wrapping_add(2 * BYTE_TIME_US);
            self.rx.push_back((at, extra));
        }
        self.maybe_answer();
        Ok(())
    }

    fn available(&mut self) -> usize {
        self.rx.iter().take_while(|(at, _)| self.arrived(*at)).count()
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let ready = matches!(self.rx.front(), Some((at, _)) if self.arrived(*at));
        if !ready {
            return Err(SimLineError::Empty);
        }
        self.rx
            .pop_front()
            .map(|(_, byte)| byte)
            .ok_or(SimLineError::Empty)
    }

    fn suspend(&mut self) -> Result<(), Self::Error> {
        self.suspend_count += 1;
        if self.refuse_suspend {
            return Err(SimLineError::Refused);
        }
        self.bench.suspended.set(true);
        Ok(())
    }

    fn resume(&mut self) -> Result<(), Self::Error> {
        self.resume_count += 1;
        if self.refuse_resume {
            return Err(SimLineError::Refused);
        }
        self.bench.suspended.set(false);
        Ok(())
    }
}

//==================================================================================PIN_AND_DELAY
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinFault;

impl digital::Error for PinFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Wake-up pin recording `(level_high, line_suspended)` for every write.
pub struct SimPin {
    bench: Rc<Bench>,
    pub levels: Vec<(bool, bool)>,
    pub broken: bool,
}

impl SimPin {
    pub fn new(bench: &Rc<Bench>) -> Self {
        Self {
            bench: Rc::clone(bench),
            levels: Vec::new(),
            broken: false,
        }
    }

    pub fn broken(bench: &Rc<Bench>) -> Self {
        Self {
            broken: true,
            ..Self::new(bench)
        }
    }

    fn drive(&mut self, high: bool) -> Result<(), PinFault> {
        if self.broken {
            return Err(PinFault);
        }
        self.levels.push((high, self.bench.is_suspended()));
        Ok(())
    }
}

impl ErrorType for SimPin {
    type Error = PinFault;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true)
    }
}

/// Delay advancing the virtual clock and recording every requested pause.
pub struct SimDelay {
    bench: Rc<Bench>,
    pub pauses_ms: Vec<u32>,
}

impl SimDelay {
    pub fn new(bench: &Rc<Bench>) -> Self {
        Self {
            bench: Rc::clone(bench),
            pauses_ms: Vec::new(),
        }
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.bench.advance_us(ns / 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.pauses_ms.push(ms);
        self.bench.advance_ms(ms);
    }
}

//==================================================================================FRAMES
/// ECU → tester frame with length byte and checksum.
pub fn ecu_frame(data: &[u8]) -> Vec<u8> {
    let mut frame = vec![0x80, TESTER, ECU, data.len() as u8];
    frame.extend_from_slice(data);
    frame.push(checksum(&frame));
    frame
}
