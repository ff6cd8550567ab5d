mod test_handshake_signals;
mod test_host_departure;
