// ==========================================
// Cổng đăng ký học phần - Reference Catalog Repository
// ==========================================
// Courses and teachers referenced by proposals. Populated by the
// surrounding system; this core only validates references and reads.
// ==========================================

use crate::domain::proposal::{Course, Teacher};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub struct CatalogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CatalogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert_course(&self, course: &Course) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            "INSERT INTO course (course_id, code, name) VALUES (?, ?, ?)",
            params![&course.course_id, &course.code, &course.name],
        )?;

        Ok(course.course_id.clone())
    }

    pub fn insert_teacher(&self, teacher: &Teacher) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            "INSERT INTO teacher (teacher_id, name, department) VALUES (?, ?, ?)",
            params![&teacher.teacher_id, &teacher.name, &teacher.department],
        )?;

        Ok(teacher.teacher_id.clone())
    }

    pub fn course_exists(&self, course_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let found: Option<bool> = conn
            .query_row(
                "SELECT 1 FROM course WHERE course_id = ? LIMIT 1",
                params![course_id],
                |_row| Ok(true),
            )
            .optional()?;

        Ok(found.unwrap_or(false))
    }

    pub fn teacher_exists(&self, teacher_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let found: Option<bool> = conn
            .query_row(
                "SELECT 1 FROM teacher WHERE teacher_id = ? LIMIT 1",
                params![teacher_id],
                |_row| Ok(true),
            )
            .optional()?;

        Ok(found.unwrap_or(false))
    }

    pub fn find_course(&self, course_id: &str) -> RepositoryResult<Option<Course>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            "SELECT course_id, code, name FROM course WHERE course_id = ?",
            params![course_id],
            |row| {
                Ok(Course {
                    course_id: row.get(0)?,
                    code: row.get(1)?,
                    name: row.get(2)?,
                })
            },
        ) {
            Ok(course) => Ok(Some(course)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn find_teacher(&self, teacher_id: &str) -> RepositoryResult<Option<Teacher>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            "SELECT teacher_id, name, department FROM teacher WHERE teacher_id = ?",
            params![teacher_id],
            |row| {
                Ok(Teacher {
                    teacher_id: row.get(0)?,
                    name: row.get(1)?,
                    department: row.get(2)?,
                })
            },
        ) {
            Ok(teacher) => Ok(Some(teacher)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
