pub(in crate::app) mod details;
mod panels;
