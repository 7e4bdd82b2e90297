mod parse_good;
mod sources;
