//! Routing Resolver - (type, location, priority) to destination service
//!
//! The decision table is data. `RoutingTable::standard` expands two row
//! sets over the whole enumerated domain; adding a combination means
//! adding a row.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::value_objects::{DestinationService, EmergencyType, LocationClass, Priority};

/// Medical rows: location and priority both matter
const MEDICAL_ROUTES: &[(LocationClass, Priority, DestinationService)] = &[
    (LocationClass::Residence, Priority::Red, DestinationService::Demva),
    (LocationClass::Residence, Priority::Yellow, DestinationService::Demva),
    (LocationClass::Residence, Priority::Green, DestinationService::Telemedicine),
    (LocationClass::PublicRoad, Priority::Red, DestinationService::Cec),
    (LocationClass::PublicRoad, Priority::Yellow, DestinationService::Cec),
    (LocationClass::PublicRoad, Priority::Green, DestinationService::Cec),
];

/// Department rows: one service regardless of location and priority
const DEPARTMENT_ROUTES: &[(EmergencyType, DestinationService)] = &[
    (EmergencyType::Fire, DestinationService::FireDept),
    (EmergencyType::Security, DestinationService::SecurityDept),
    (EmergencyType::CivilDefense, DestinationService::CivilDefenseDept),
    (EmergencyType::Other, DestinationService::OtherDept),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteKey {
    pub emergency_type: EmergencyType,
    pub location_class: LocationClass,
    pub priority: Priority,
}

impl RouteKey {
    pub fn new(
        emergency_type: EmergencyType,
        location_class: LocationClass,
        priority: Priority,
    ) -> Self {
        Self {
            emergency_type,
            location_class,
            priority,
        }
    }
}

/// Resolved destinations for a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub primary: DestinationService,
    /// Always the supervisor
    pub secondary: DestinationService,
}

impl Route {
    pub fn new(primary: DestinationService) -> Self {
        Self {
            primary,
            secondary: DestinationService::Supervisor,
        }
    }

    /// Primary then secondary, without duplicates
    pub fn destinations(&self) -> Vec<DestinationService> {
        if self.primary == self.secondary {
            vec![self.primary]
        } else {
            vec![self.primary, self.secondary]
        }
    }
}

/// Lookup table keyed by (type, location, priority)
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    entries: HashMap<RouteKey, DestinationService>,
}

impl RoutingTable {
    /// Empty table; every lookup is unmapped until rows are added
    pub fn empty() -> Self {
        Self::default()
    }

    /// The dispatch center's decision table, total over the domain
    pub fn standard() -> Self {
        let mut table = Self::empty();

        for &(location, priority, destination) in MEDICAL_ROUTES {
            table = table.with_route(
                RouteKey::new(EmergencyType::Medical, location, priority),
                destination,
            );
        }

        for &(emergency_type, destination) in DEPARTMENT_ROUTES {
            for location in LocationClass::ALL {
                for priority in Priority::ALL {
                    table = table.with_route(
                        RouteKey::new(emergency_type, location, priority),
                        destination,
                    );
                }
            }
        }

        table
    }

    /// Add or replace one row
    pub fn with_route(mut self, key: RouteKey, destination: DestinationService) -> Self {
        self.entries.insert(key, destination);
        self
    }

    pub fn get(&self, key: &RouteKey) -> Option<DestinationService> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves destinations from an injected routing table
#[derive(Debug, Clone)]
pub struct RoutingResolver {
    table: Arc<RoutingTable>,
}

impl RoutingResolver {
    pub fn new(table: Arc<RoutingTable>) -> Self {
        Self { table }
    }

    pub fn resolve(
        &self,
        emergency_type: EmergencyType,
        location_class: LocationClass,
        priority: Priority,
    ) -> Result<Route, DomainError> {
        let key = RouteKey::new(emergency_type, location_class, priority);

        self.table
            .get(&key)
            .map(Route::new)
            .ok_or(DomainError::UnmappedRoute {
                emergency_type,
                location_class,
                priority,
            })
    }
}

impl Default for RoutingResolver {
    fn default() -> Self {
        Self::new(Arc::new(RoutingTable::standard()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary(t: EmergencyType, l: LocationClass, p: Priority) -> DestinationService {
        RoutingResolver::default().resolve(t, l, p).unwrap().primary
    }

    #[test]
    fn test_standard_table_is_total() {
        let table = RoutingTable::standard();
        assert_eq!(
            table.len(),
            EmergencyType::ALL.len() * LocationClass::ALL.len() * Priority::ALL.len()
        );
    }

    #[test]
    fn test_medical_residence_rows() {
        use EmergencyType::Medical;
        use LocationClass::Residence;

        assert_eq!(primary(Medical, Residence, Priority::Red), DestinationService::Demva);
        assert_eq!(primary(Medical, Residence, Priority::Yellow), DestinationService::Demva);
        assert_eq!(
            primary(Medical, Residence, Priority::Green),
            DestinationService::Telemedicine
        );
    }

    #[test]
    fn test_medical_public_road_is_cec_for_any_priority() {
        for priority in Priority::ALL {
            assert_eq!(
                primary(EmergencyType::Medical, LocationClass::PublicRoad, priority),
                DestinationService::Cec
            );
        }
    }

    #[test]
    fn test_departments_ignore_location_and_priority() {
        for location in LocationClass::ALL {
            for priority in Priority::ALL {
                assert_eq!(
                    primary(EmergencyType::Fire, location, priority),
                    DestinationService::FireDept
                );
                assert_eq!(
                    primary(EmergencyType::Security, location, priority),
                    DestinationService::SecurityDept
                );
                assert_eq!(
                    primary(EmergencyType::CivilDefense, location, priority),
                    DestinationService::CivilDefenseDept
                );
                assert_eq!(
                    primary(EmergencyType::Other, location, priority),
                    DestinationService::OtherDept
                );
            }
        }
    }

    #[test]
    fn test_supervisor_always_secondary() {
        let resolver = RoutingResolver::default();
        for t in EmergencyType::ALL {
            for l in LocationClass::ALL {
                for p in Priority::ALL {
                    let route = resolver.resolve(t, l, p).unwrap();
                    assert_eq!(route.secondary, DestinationService::Supervisor);
                    assert_eq!(route.destinations().len(), 2);
                }
            }
        }
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let resolver = RoutingResolver::default();
        let first = resolver.resolve(EmergencyType::Medical, LocationClass::Residence, Priority::Green);
        let second = resolver.resolve(EmergencyType::Medical, LocationClass::Residence, Priority::Green);
        assert_eq!(first.unwrap(), second.unwrap());
    }

    #[test]
    fn test_partial_table_reports_unmapped_route() {
        let table = RoutingTable::empty().with_route(
            RouteKey::new(EmergencyType::Fire, LocationClass::Residence, Priority::Red),
            DestinationService::FireDept,
        );
        let resolver = RoutingResolver::new(Arc::new(table));

        let err = resolver
            .resolve(EmergencyType::Fire, LocationClass::PublicRoad, Priority::Red)
            .unwrap_err();
        assert!(matches!(err, DomainError::UnmappedRoute { .. }));
    }
}
