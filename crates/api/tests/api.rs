mod handlers;
mod test_utils;
