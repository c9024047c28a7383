/// Export of the finished session as a named archive

pub mod archive;
