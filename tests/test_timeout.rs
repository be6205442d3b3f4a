use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use confetch::{ErrorKind, RequestBuilder};

#[test]
fn request_fails_due_to_timeout() {
    let listener = TcpListener::bind("localhost:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let thread = thread::spawn(move || {
        let _stream = listener.accept().unwrap();
        thread::sleep(Duration::from_millis(500));
    });

    let result = RequestBuilder::new()
        .timeout(Duration::from_millis(100))
        .get(format!("http://localhost:{}", port));

    match result {
        Err(err) => match err.kind() {
            ErrorKind::Transport(_) => (),
            err => panic!("Unexpected error: {:?}", err),
        },
        Ok(body) => panic!("Unexpected response: {:?}", body),
    }

    thread.join().unwrap();
}

#[test]
fn request_fails_due_to_refused_connection() {
    // Grab a free port and release it so nothing is listening there.
    let port = {
        let listener = TcpListener::bind("localhost:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let result = RequestBuilder::new()
        .connect_timeout(Duration::from_millis(500))
        .get(format!("http://localhost:{}", port));

    match result {
        Err(err) => match err.kind() {
            ErrorKind::Transport(err) => assert!(!err.message().is_empty()),
            err => panic!("Unexpected error: {:?}", err),
        },
        Ok(body) => panic!("Unexpected response: {:?}", body),
    }
}
