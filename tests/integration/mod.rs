mod entrypoint_run;
mod fragment_merge;
mod test_utils;
