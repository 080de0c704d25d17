mod common;
mod features;
mod rules;
mod scorer;
