/*!
# Mseedprune: Channel Identity
*/

use std::{
	cmp::Ordering,
	fmt,
};



#[derive(Debug, Clone, Eq, PartialEq, Hash)]
/// # Channel Identity.
///
/// The `(network, station, location, channel)` tuple used to group records
/// into traces. Quality is deliberately excluded — it contributes to
/// pruning priority, never to aggregation identity.
pub struct ChannelId {
	/// # Network.
	pub network: String,
	/// # Station.
	pub station: String,
	/// # Location.
	pub location: String,
	/// # Channel.
	pub channel: String,
}

impl fmt::Display for ChannelId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}_{}_{}_{}", self.network, self.station, self.location, self.channel)
	}
}

impl Ord for ChannelId {
	fn cmp(&self, other: &Self) -> Ordering {
		(&self.network, &self.station, &self.location, &self.channel)
			.cmp(&(&other.network, &other.station, &other.location, &other.channel))
	}
}

impl PartialOrd for ChannelId {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl ChannelId {
	#[must_use]
	/// # New.
	pub fn new<A, B, C, D>(network: A, station: B, location: C, channel: D) -> Self
	where A: Into<String>, B: Into<String>, C: Into<String>, D: Into<String> {
		Self {
			network: network.into(),
			station: station.into(),
			location: location.into(),
			channel: channel.into(),
		}
	}

	#[must_use]
	/// # Tag With Quality.
	///
	/// Builds the `NET_STA_LOC_CHAN_QUAL` string the match/reject regexes in
	/// §4.D are applied against.
	pub fn tag(&self, quality: char) -> String {
		format!("{}_{quality}", self)
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_display() {
		let c = ChannelId::new("IU", "ANMO", "00", "BHZ");
		assert_eq!(c.to_string(), "IU_ANMO_00_BHZ");
		assert_eq!(c.tag('D'), "IU_ANMO_00_BHZ_D");
	}

	#[test]
	fn t_ord() {
		let a = ChannelId::new("IU", "ANMO", "00", "BHZ");
		let b = ChannelId::new("IU", "ANMO", "00", "LHZ");
		assert!(a < b);
	}

	#[test]
	fn t_eq_ignores_nothing_but_is_quality_free() {
		let a = ChannelId::new("IU", "ANMO", "00", "BHZ");
		let b = ChannelId::new("IU", "ANMO", "00", "BHZ");
		assert_eq!(a, b);
	}
}
