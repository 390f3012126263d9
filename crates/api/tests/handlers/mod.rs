mod analytics_test;
mod match_requests_test;
mod middleware_test;
mod tutors_test;
