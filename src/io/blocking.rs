// Copyright 2022 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implementation of the blocking I/O provider.

// NOTE: A receive error other than a timeout or interruption exits the
// worker task, which makes the thread group respawn it (throttled, so
// a persistently failing socket cannot eat all CPU time). Send errors
// are only logged; the worker keeps receiving.

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{error, info};

use crate::message::MAX_UDP_MESSAGE_SIZE;
use crate::server::{Response, Server};
use crate::thread::ThreadGroup;

/// A blocking I/O provider.
///
/// This provider uses blocking I/O on standard library UDP sockets.
/// Each bound socket is served by a configurable number of worker
/// threads; each worker handles one datagram completely (receive,
/// respond, send) before receiving the next. With one worker, datagrams
/// are therefore answered strictly in arrival order.
///
/// To stop the provider, shut down the [`ThreadGroup`] in which it was
/// started (see [`BlockingIoProvider::start`]). Workers notice within
/// [`CHECK_FOR_SHUTDOWN_TIMEOUT`].
pub struct BlockingIoProvider {
    config: BlockingIoConfig,
    udp_sockets: Vec<Arc<UdpSocket>>,
}

/// Configuration options for the [`BlockingIoProvider`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlockingIoConfig {
    /// The number of UDP worker threads to run for each UDP socket.
    pub udp_workers_per_socket: usize,
}

impl Default for BlockingIoConfig {
    fn default() -> Self {
        Self {
            udp_workers_per_socket: 1,
        }
    }
}

/// The read timeout of the UDP sockets. Workers check for thread group
/// shutdown between receives, so this is the longest shutdown has to
/// wait for them.
pub const CHECK_FOR_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

impl BlockingIoProvider {
    /// Creates a new `BlockingIoProvider`. This call binds the UDP
    /// sockets in preparation, but does not start serving.
    pub fn bind<U>(config: BlockingIoConfig, udp_addrs: U) -> io::Result<Self>
    where
        U: IntoIterator<Item = SocketAddr>,
    {
        let mut udp_sockets = Vec::new();
        for addr in udp_addrs {
            let socket = UdpSocket::bind(addr)?;
            socket.set_read_timeout(Some(CHECK_FOR_SHUTDOWN_TIMEOUT))?;
            udp_sockets.push(Arc::new(socket));
        }
        Ok(Self {
            config,
            udp_sockets,
        })
    }

    /// Returns the local addresses of the bound sockets. This is how to
    /// learn the port when binding to port 0.
    pub fn local_addrs(&self) -> io::Result<Vec<SocketAddr>> {
        self.udp_sockets
            .iter()
            .map(|socket| socket.local_addr())
            .collect()
    }

    /// Starts serving on the provided [`ThreadGroup`]. The sockets are
    /// closed once every worker has exited.
    pub fn start(
        self,
        server: &Arc<Server>,
        group: &Arc<ThreadGroup>,
    ) -> Result<(), crate::thread::Error> {
        for (i, udp_socket) in self.udp_sockets.into_iter().enumerate() {
            if let Ok(addr) = udp_socket.local_addr() {
                info!("Serving UDP on {}", addr);
            }
            for j in 0..self.config.udp_workers_per_socket {
                let name = format!("udp worker {i}/{j}");
                let group_clone = group.clone();
                let server = server.clone();
                let udp_socket = udp_socket.clone();
                let task = move || {
                    log_io_errors(run_udp_worker(&group_clone, &server, &udp_socket));
                };
                group.start_respawnable(name, task)?;
            }
        }
        Ok(())
    }
}

/// The UDP receive/handle/send loop.
fn run_udp_worker(group: &ThreadGroup, server: &Server, socket: &UdpSocket) -> io::Result<()> {
    let mut received_buf = [0; MAX_UDP_MESSAGE_SIZE];
    let mut response_buf = [0; MAX_UDP_MESSAGE_SIZE];

    loop {
        if group.is_shutting_down() {
            return Ok(());
        }

        // If interrupted, we check for shutdown again before retrying.
        // Otherwise, repeated interruptions could in theory prevent the
        // call from ever timing out.
        let (received_len, src) = match socket.recv_from(&mut received_buf) {
            Ok(pair) => pair,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => continue,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        match server.handle_message(&received_buf[..received_len], src, &mut response_buf) {
            Response::Single(response_len) => {
                log_io_errors(retry_if_interrupted(|| {
                    socket.send_to(&response_buf[..response_len], src)
                }));
            }
            Response::None => (),
        }
    }
}

/// Executes `f`, retrying the operation if it is interrupted.
fn retry_if_interrupted<F, R>(mut f: F) -> io::Result<R>
where
    F: FnMut() -> io::Result<R>,
{
    loop {
        match f() {
            Ok(r) => return Ok(r),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Logs errors if a task exits with an I/O error.
fn log_io_errors<T>(result: io::Result<T>) {
    if let Err(e) = result {
        let current_thread = thread::current();
        let thread_name = current_thread.name().unwrap_or("anonymous thread");
        error!("I/O error in thread {}: {}", thread_name, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::demo_response;

    #[test]
    fn loopback_datagrams_get_the_fixed_response() {
        let config = BlockingIoConfig {
            udp_workers_per_socket: 2,
        };
        let localhost: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let provider = BlockingIoProvider::bind(config, [localhost]).unwrap();
        let server_addr = provider.local_addrs().unwrap()[0];
        let server = Arc::new(Server::new(demo_response().unwrap()));
        let expected = server.response().serialize().unwrap();
        let group = ThreadGroup::new();
        provider.start(&server, &group).unwrap();

        let client = UdpSocket::bind(localhost).unwrap();
        client.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let mut buf = [0; MAX_UDP_MESSAGE_SIZE];
        let datagrams: [&[u8]; 3] = [b"hello", &[0; 512], b"\x04\xd2\x01\x00"];
        for datagram in datagrams {
            client.send_to(datagram, server_addr).unwrap();
            let (len, from) = client.recv_from(&mut buf).unwrap();
            assert_eq!(from, server_addr);
            assert_eq!(&buf[..len], expected);
        }

        group.shut_down();
        group.await_shutdown();
    }

    #[test]
    fn retry_if_interrupted_retries() {
        let mut attempts = 0;
        let result = retry_if_interrupted(|| {
            attempts += 1;
            if attempts < 3 {
                Err(io::Error::from(io::ErrorKind::Interrupted))
            } else {
                Ok(attempts)
            }
        });
        assert_eq!(result.unwrap(), 3);
    }
}
