pub mod flow;
pub mod frame;
pub mod pcap;
