//! OSC listener — UDP socket listener on a dedicated thread.

use std::io;
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rosc::{decoder, OscPacket};
use tracing::{debug, info, warn};

use super::config::OscConfig;
use super::mapping::{apply_osc_message, OscMapping};
use crate::control::ControlSender;

/// Active OSC listener running on a background thread.
pub struct OscListener {
    stop_flag: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    port: u16,
}

impl OscListener {
    /// Start listening for OSC messages on a UDP port.
    pub fn start(config: &OscConfig, sender: ControlSender) -> io::Result<Self> {
        let addr = format!("127.0.0.1:{}", config.listen_port);
        let socket = UdpSocket::bind(&addr)?;
        // Short timeout so the stop flag is checked periodically
        socket.set_read_timeout(Some(Duration::from_millis(100)))?;

        let stop_flag = Arc::new(AtomicBool::new(false));
        let stop_clone = stop_flag.clone();
        let mappings = config.mappings.clone();
        let port = config.listen_port;

        let thread = thread::spawn(move || {
            let mut buf = [0u8; rosc::decoder::MTU];
            while !stop_clone.load(Ordering::Relaxed) {
                match socket.recv_from(&mut buf) {
                    Ok((size, from)) => match decoder::decode_udp(&buf[..size]) {
                        Ok((_, packet)) => {
                            if !dispatch(&packet, &mappings, &sender) {
                                // Receiver gone; nobody left to control.
                                break;
                            }
                        }
                        Err(e) => debug!(%from, "ignoring malformed OSC packet: {e}"),
                    },
                    Err(ref e)
                        if matches!(
                            e.kind(),
                            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                        ) =>
                    {
                        continue;
                    }
                    Err(e) => {
                        warn!("OSC socket error, listener stopping: {e}");
                        break;
                    }
                }
            }
        });

        info!(port, "OSC listener started");

        Ok(Self {
            stop_flag,
            thread: Some(thread),
            port,
        })
    }

    /// Get the listening port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Signal the listener to stop and wait for its thread.
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for OscListener {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Forward every mapped message in `packet`, recursing into bundles.
/// Returns `false` once the receiving side has hung up.
fn dispatch(packet: &OscPacket, mappings: &[OscMapping], sender: &ControlSender) -> bool {
    match packet {
        OscPacket::Message(msg) => match apply_osc_message(msg, mappings) {
            Some(event) => {
                debug!(addr = %msg.addr, "OSC control event");
                sender.send(event).is_ok()
            }
            None => {
                debug!(addr = %msg.addr, "unmapped OSC message");
                true
            }
        },
        OscPacket::Bundle(bundle) => bundle
            .content
            .iter()
            .all(|inner| dispatch(inner, mappings, sender)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{control_channel, ControlEvent};
    use crate::osc::mapping::OscTarget;
    use rosc::{encoder, OscBundle, OscMessage, OscTime, OscType};

    fn eval_config(port: u16) -> OscConfig {
        OscConfig {
            listen_port: port,
            mappings: vec![OscMapping {
                address_pattern: "/eval".to_string(),
                target: OscTarget::Eval,
            }],
        }
    }

    fn send(packet: &OscPacket, port: u16) {
        let encoded = encoder::encode(packet).unwrap();
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .send_to(&encoded, format!("127.0.0.1:{port}"))
            .unwrap();
    }

    fn eval_msg(src: &str) -> OscPacket {
        OscPacket::Message(OscMessage {
            addr: "/eval".to_string(),
            args: vec![OscType::String(src.to_string())],
        })
    }

    #[test]
    fn start_and_stop() {
        let (tx, _rx) = control_channel();
        let mut listener = OscListener::start(&eval_config(19100), tx).unwrap();
        assert_eq!(listener.port(), 19100);
        listener.stop();
    }

    #[test]
    fn send_and_receive_eval() {
        let (tx, rx) = control_channel();
        let mut listener = OscListener::start(&eval_config(19101), tx).unwrap();

        send(&eval_msg("t>>3"), 19101);
        thread::sleep(Duration::from_millis(200));

        assert_eq!(
            rx.poll(),
            Some(ControlEvent::SetExpression("t>>3".to_string()))
        );
        listener.stop();
    }

    #[test]
    fn bundle_contents_are_dispatched() {
        let (tx, rx) = control_channel();
        let mut listener = OscListener::start(&eval_config(19102), tx).unwrap();

        let bundle = OscPacket::Bundle(OscBundle {
            timetag: OscTime {
                seconds: 0,
                fractional: 1,
            },
            content: vec![eval_msg("t"), eval_msg("t*2")],
        });
        send(&bundle, 19102);
        thread::sleep(Duration::from_millis(200));

        assert_eq!(
            std::iter::from_fn(|| rx.poll()).collect::<Vec<_>>(),
            vec![
                ControlEvent::SetExpression("t".to_string()),
                ControlEvent::SetExpression("t*2".to_string()),
            ]
        );
        listener.stop();
    }

    #[test]
    fn bind_failure_on_used_port() {
        let (tx1, _rx1) = control_channel();
        let _listener1 = OscListener::start(&eval_config(19103), tx1).unwrap();

        let (tx2, _rx2) = control_channel();
        assert!(OscListener::start(&eval_config(19103), tx2).is_err());
    }
}
