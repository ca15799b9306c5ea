mod graph_writer;

pub use graph_writer::GraphWriter;
