use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;

pub const TEMPLATE_FILE_NAME: &str = "ksend.properties";

const TEMPLATE: &str = "\
##
## Generated by ksend
##
##
# General Config
##
# bootstrap.servers=localhost:9092
# client.id=TestClient
# security.protocol=SASL_SSL
# ssl.ca.location=/var/ssl/private/ca.pem
# sasl.mechanism=PLAIN
# sasl.username=client
# sasl.password=client-secret
##
##
## Producer Config
##
# acks=1
# batch.num.messages=10000
# compression.type=none
# linger.ms=10000
# enable.idempotence=false
# max.in.flight.requests.per.connection=5
# message.max.bytes=1000000
# partitioner=consistent_random
# retries=2147483647
# retry.backoff.ms=100
# transactional.id=
##
## Consumer Config
##
# group.id=TestConsumerGroup
# group.instance.id=TestConsumerInstance
# client.rack=
# enable.auto.commit=true
# auto.offset.reset=latest
# fetch.max.bytes=52428800
# fetch.wait.max.ms=500
# fetch.min.bytes=1
# isolation.level=read_committed
# max.poll.interval.ms=300000
";

/// Fixed output path in the system temp directory, overwritten on every run.
pub fn template_path() -> PathBuf {
    env::temp_dir().join(TEMPLATE_FILE_NAME)
}

/// Writes the annotated client config template and returns its path.
pub fn generate() -> anyhow::Result<PathBuf> {
    let path = template_path();
    fs::write(&path, TEMPLATE)
        .with_context(|| format!("failed to write client config template {}", path.display()))?;
    Ok(path)
}
