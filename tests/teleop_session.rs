//! End-to-end teleoperation session over localhost.
//!
//! A robot with mock hardware listens on ephemeral ports; a console with a
//! scripted provider connects, receives camera frames, and sends control
//! records. Asserts the full path: provider input -> diff transmission ->
//! wire decode -> PWM duties.

use parking_lot::Mutex;
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use vrcar::protocol::command::{Command, ControlState};
use vrcar::provider::{Provider, ProviderComposer};
use vrcar::robot::motors::MOTOR_CHANNELS;
use vrcar::robot::pwm::{shared, MockPwm, PwmDriver};
use vrcar::robot::{self, CaptureSource};
use vrcar::{console, Result};

const FRAME_PAYLOAD: &[u8] = b"not-really-a-jpeg-but-opaque-bytes";

/// Capture source emitting a fixed payload at a steady rate
struct TestCapture;

impl CaptureSource for TestCapture {
    fn next_frame(&mut self) -> Result<Vec<u8>> {
        std::thread::sleep(Duration::from_millis(5));
        Ok(FRAME_PAYLOAD.to_vec())
    }
}

/// Scripted operator: raises HEAD_H and MOVE on the first tick, then ends
/// the session once a frame has arrived
struct ScriptedOperator {
    ticks: u32,
    frames: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl Provider for ScriptedOperator {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn draw(&mut self, frame: &[u8]) {
        self.frames.lock().push(frame.to_vec());
    }

    fn update(&mut self, state: &mut ControlState) -> bool {
        self.ticks += 1;
        if self.ticks == 1 {
            state.set(Command::HeadH, 0.25);
            state.set(Command::Move, 1.0);
        }

        // Quit once a frame made it through (bounded so a broken camera
        // path fails the test instead of hanging it).
        let saw_frame = !self.frames.lock().is_empty();
        !(saw_frame && self.ticks >= 3) && self.ticks < 1000
    }

    fn wait(&mut self) {
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn test_teleoperation_session_end_to_end() {
    let camera_listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let controls_listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let camera_port = camera_listener.local_addr().unwrap().port();
    let controls_port = controls_listener.local_addr().unwrap().port();

    let mock_pwm = MockPwm::new();
    let robot_pwm = shared(Box::new(mock_pwm.clone()) as Box<dyn PwmDriver>);
    let robot_running = Arc::new(AtomicBool::new(true));

    let robot_thread = {
        let running = Arc::clone(&robot_running);
        std::thread::spawn(move || {
            robot::run(
                camera_listener,
                controls_listener,
                Box::new(TestCapture),
                robot_pwm,
                running,
            )
        })
    };

    let frames = Arc::new(Mutex::new(Vec::new()));
    let mut composer = ProviderComposer::new();
    composer.register(Box::new(ScriptedOperator {
        ticks: 0,
        frames: Arc::clone(&frames),
    }));

    let console_running = Arc::new(AtomicBool::new(true));
    console::run(
        "127.0.0.1",
        camera_port,
        controls_port,
        composer,
        console_running,
    )
    .unwrap();

    robot_thread.join().unwrap().unwrap();

    // Camera path: at least one frame arrived intact at the provider.
    let frames = frames.lock();
    assert!(!frames.is_empty());
    assert_eq!(frames[0], FRAME_PAYLOAD);

    // HEAD_H raw 0.25 -> wire 0x04 0x87 (135) -> pan servo at 135 deg,
    // which is 409 counts on channel 8.
    assert_eq!(mock_pwm.duty(8), 409);

    // Tilt never commanded: still centered at 90 deg (307 counts).
    assert_eq!(mock_pwm.duty(9), 307);

    // The session ended after MOVE=1.0, so the control session's exit
    // path braked all wheels: both channels of every pair at full scale.
    for (reverse, forward) in MOTOR_CHANNELS {
        assert_eq!(mock_pwm.duty(forward), 4095);
        assert_eq!(mock_pwm.duty(reverse), 4095);
    }
}

#[test]
fn test_robot_shuts_down_without_client() {
    let camera_listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let controls_listener = TcpListener::bind("127.0.0.1:0").unwrap();

    let running = Arc::new(AtomicBool::new(true));
    let handle = {
        let running = Arc::clone(&running);
        std::thread::spawn(move || {
            robot::run(
                camera_listener,
                controls_listener,
                Box::new(TestCapture),
                shared(Box::new(MockPwm::new())),
                running,
            )
        })
    };

    std::thread::sleep(Duration::from_millis(100));
    running.store(false, Ordering::Relaxed);

    handle.join().unwrap().unwrap();
}
